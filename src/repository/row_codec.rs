// ==========================================
// 气瓶充装调度系统 - 行映射辅助
// ==========================================
// 职责: TEXT 列 ↔ 领域枚举/时间戳 的编解码
// 时间戳统一以 RFC3339 存储
// ==========================================

use crate::domain::types::{CylinderSize, CylinderStatus, GasType, TransactionKind};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::Result as SqliteResult;

fn conversion_error(idx: usize, message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, message.into())
}

pub(crate) fn format_ts(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub(crate) fn parse_ts(idx: usize, raw: &str) -> SqliteResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub(crate) fn parse_gas(idx: usize, raw: &str) -> SqliteResult<GasType> {
    GasType::parse(raw).ok_or_else(|| conversion_error(idx, format!("未知气体种类: {}", raw)))
}

pub(crate) fn parse_size(idx: usize, raw: &str) -> SqliteResult<CylinderSize> {
    CylinderSize::parse(raw).ok_or_else(|| conversion_error(idx, format!("未知规格: {}", raw)))
}

pub(crate) fn parse_status(idx: usize, raw: &str) -> SqliteResult<CylinderStatus> {
    CylinderStatus::parse(raw).ok_or_else(|| conversion_error(idx, format!("未知状态: {}", raw)))
}

pub(crate) fn parse_kind(idx: usize, raw: &str) -> SqliteResult<TransactionKind> {
    TransactionKind::parse(raw)
        .ok_or_else(|| conversion_error(idx, format!("未知流水类型: {}", raw)))
}

// ==========================================
// 气瓶充装调度系统 - 批量导入中间结构
// ==========================================
// 生命周期: 仅在导入预览 → 确认之间存在,不落库
// ==========================================

use crate::domain::cylinder::CylinderDraft;
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// RawImportLine - 文件解析产物（未校验）
// ==========================================
// 字段固定顺序: serial_code, gas_type, size, status, last_location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawImportLine {
    pub row_number: usize,
    pub fields: Vec<String>,
}

// ==========================================
// ImportRowError - 行级校验失败原因
// ==========================================
// 非致命: 不中断批次,仅该行不入库
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ImportRowError {
    MissingFields,     // 字段数不足 3
    InvalidGasType,
    InvalidSize,
    MissingSerialCode,
    DuplicateSerialCode, // 同一文件内钢印重复
}

impl ImportRowError {
    /// 面向操作员的原因文本
    pub fn reason(&self) -> &'static str {
        match self {
            ImportRowError::MissingFields => "Missing Required Fields",
            ImportRowError::InvalidGasType => "Invalid Gas Type",
            ImportRowError::InvalidSize => "Invalid Size",
            ImportRowError::MissingSerialCode => "Missing Serial Code",
            ImportRowError::DuplicateSerialCode => "Duplicate Serial Code",
        }
    }
}

impl fmt::Display for ImportRowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.reason())
    }
}

// ==========================================
// ImportRow - 单行校验结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportRow {
    pub row_number: usize,      // 原始文件行号（表头为第 1 行）
    pub raw_fields: Vec<String>, // 原始字段（用于预览回显）
    pub outcome: Result<CylinderDraft, ImportRowError>,
}

impl ImportRow {
    pub fn is_valid(&self) -> bool {
        self.outcome.is_ok()
    }

    pub fn error(&self) -> Option<ImportRowError> {
        self.outcome.as_ref().err().copied()
    }
}

// ==========================================
// ImportSummary - 预览汇总
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ImportSummary {
    pub total_rows: usize,
    pub valid: usize,
    pub invalid: usize,
}

impl ImportSummary {
    pub fn from_rows(rows: &[ImportRow]) -> Self {
        let valid = rows.iter().filter(|r| r.is_valid()).count();
        Self {
            total_rows: rows.len(),
            valid,
            invalid: rows.len() - valid,
        }
    }
}

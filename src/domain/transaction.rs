// ==========================================
// 气瓶充装调度系统 - 流水记录领域模型
// ==========================================
// 红线: 只追加,不修改
// 用途: 每个批次（送充 / 回库 / 出租 / 归还）产生一条记录
// ==========================================

use crate::domain::types::TransactionKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// TransactionRecord - 批次流水
// ==========================================
// cost: 送充为匹配计费合计;回库为外部录入的批次总额（不拆分到单瓶）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub transaction_id: String,
    pub kind: TransactionKind,
    pub cylinder_ids: Vec<String>,
    pub station_id: Option<String>,
    pub member_id: Option<String>,
    pub occurred_at: DateTime<Utc>,
    pub cost: f64,
    pub note: Option<String>,
}

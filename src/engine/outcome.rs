// ==========================================
// 气瓶充装调度系统 - 批次流转结果
// ==========================================
// 红线: 批次要么整体提交,要么整体不动（NoOp）
// ==========================================

use crate::domain::cylinder::Cylinder;
use crate::domain::transaction::TransactionRecord;
use crate::domain::types::CylinderStatus;
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// BatchCommit - 一次批次流转的完整产物
// ==========================================
// updated: 全部已流转的气瓶新值;record: 对应的唯一一条流水
// from: 流转前的源状态,落库时用于并发复核
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchCommit {
    pub from: CylinderStatus,
    pub updated: Vec<Cylinder>,
    pub record: TransactionRecord,
}

// ==========================================
// NoOpReason - 前置条件不满足的原因
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NoOpReason {
    EmptySelection,
    StationNotSelected,
    NegativeCost,
    MemberNotSelected,
}

impl fmt::Display for NoOpReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoOpReason::EmptySelection => write!(f, "未选择气瓶"),
            NoOpReason::StationNotSelected => write!(f, "未选择充装站"),
            NoOpReason::NegativeCost => write!(f, "费用不能为负数"),
            NoOpReason::MemberNotSelected => write!(f, "未选择租用会员"),
        }
    }
}

// ==========================================
// BatchOutcome - 批次操作结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BatchOutcome {
    Committed(BatchCommit),
    NoOp(NoOpReason),
}

impl BatchOutcome {
    pub fn is_committed(&self) -> bool {
        matches!(self, BatchOutcome::Committed(_))
    }

    pub fn commit(&self) -> Option<&BatchCommit> {
        match self {
            BatchOutcome::Committed(commit) => Some(commit),
            BatchOutcome::NoOp(_) => None,
        }
    }

    pub fn into_commit(self) -> Option<BatchCommit> {
        match self {
            BatchOutcome::Committed(commit) => Some(commit),
            BatchOutcome::NoOp(_) => None,
        }
    }
}

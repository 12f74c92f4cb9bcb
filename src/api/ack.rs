// ==========================================
// 气瓶充装调度系统 - 写入确认
// ==========================================
// 职责: 落库引擎的批次结果,并在同一调用内回读持久层
// 红线: 调用方拿到的是已提交的数据,不依赖延时后再读
// ==========================================

use crate::domain::cylinder::Cylinder;
use crate::domain::transaction::TransactionRecord;
use crate::engine::{BatchOutcome, NoOpReason};
use crate::repository::{CylinderRepository, TransactionRepository};
use crate::api::error::{ApiError, ApiResult};
use serde::{Deserialize, Serialize};

/// 批次写入确认
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BatchAck {
    /// 已提交;cylinders / record 均为提交后从持久层回读的值
    Committed {
        cylinders: Vec<Cylinder>,
        record: TransactionRecord,
    },
    /// 前置条件不满足,未写入任何数据
    NoOp { reason: NoOpReason },
}

impl BatchAck {
    pub fn is_committed(&self) -> bool {
        matches!(self, BatchAck::Committed { .. })
    }

    pub fn cylinders(&self) -> &[Cylinder] {
        match self {
            BatchAck::Committed { cylinders, .. } => cylinders,
            BatchAck::NoOp { .. } => &[],
        }
    }

    pub fn record(&self) -> Option<&TransactionRecord> {
        match self {
            BatchAck::Committed { record, .. } => Some(record),
            BatchAck::NoOp { .. } => None,
        }
    }
}

/// 落库批次结果并回读
pub(crate) fn commit_outcome(
    cylinder_repo: &CylinderRepository,
    transaction_repo: &TransactionRepository,
    outcome: BatchOutcome,
) -> ApiResult<BatchAck> {
    let commit = match outcome {
        BatchOutcome::NoOp(reason) => return Ok(BatchAck::NoOp { reason }),
        BatchOutcome::Committed(commit) => commit,
    };

    cylinder_repo.commit_batch(&commit.updated, commit.from, &commit.record)?;

    let ids: Vec<String> = commit
        .updated
        .iter()
        .map(|c| c.cylinder_id.clone())
        .collect();
    let cylinders = cylinder_repo.find_by_ids(&ids)?;
    let record = transaction_repo
        .find_by_id(&commit.record.transaction_id)?
        .ok_or_else(|| {
            ApiError::DatabaseTransactionError(format!(
                "流水记录提交后不可读: {}",
                commit.record.transaction_id
            ))
        })?;

    Ok(BatchAck::Committed { cylinders, record })
}

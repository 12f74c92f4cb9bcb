// ==========================================
// 气瓶充装调度系统 - 出租 / 归还流程
// ==========================================
// 状态机:
// - Available → (rent) → Rented
// - Rented → (return, 空瓶) → EmptyRefill
// - Rented → (return, 满瓶) → Available
// 说明: 归还空瓶是进入 EmptyRefill 的唯一流程入口
// ==========================================

use crate::config::RefillSettings;
use crate::domain::cylinder::Cylinder;
use crate::domain::transaction::TransactionRecord;
use crate::domain::types::{CylinderStatus, TransactionKind};
use crate::engine::error::EngineResult;
use crate::engine::outcome::{BatchCommit, BatchOutcome, NoOpReason};
use crate::engine::transition::transition_batch;
use chrono::{DateTime, Utc};
use tracing::{info, instrument};

pub struct RentalWorkflow {
    settings: RefillSettings,
}

impl RentalWorkflow {
    pub fn new(settings: RefillSettings) -> Self {
        Self { settings }
    }

    /// 出租一批气瓶给会员
    ///
    /// # 参数
    /// - member_id: 租用会员（空白 = 未选择）
    /// - cylinder_ids: 选中气瓶ID（须全部为 Available）
    #[instrument(skip(self, cylinder_ids, snapshot), fields(batch = cylinder_ids.len()))]
    pub fn rent(
        &self,
        member_id: &str,
        cylinder_ids: &[String],
        snapshot: &[Cylinder],
        now: DateTime<Utc>,
    ) -> EngineResult<BatchOutcome> {
        if cylinder_ids.is_empty() {
            return Ok(BatchOutcome::NoOp(NoOpReason::EmptySelection));
        }
        let member_id = member_id.trim();
        if member_id.is_empty() {
            return Ok(BatchOutcome::NoOp(NoOpReason::MemberNotSelected));
        }

        let updated = transition_batch(
            cylinder_ids,
            snapshot,
            CylinderStatus::Available,
            CylinderStatus::Rented,
            now,
            |c| {
                c.holder_id = Some(member_id.to_string());
                c.last_location = member_id.to_string();
            },
        )?;

        let record = Self::record(TransactionKind::Rental, &updated, Some(member_id), now);
        info!(member_id, count = updated.len(), "出租批次已生成");

        Ok(BatchOutcome::Committed(BatchCommit {
            from: CylinderStatus::Available,
            updated,
            record,
        }))
    }

    /// 归还一批气瓶
    ///
    /// # 参数
    /// - cylinder_ids: 选中气瓶ID（须全部为 Rented）
    /// - empty: true = 空瓶归还（进入 EmptyRefill 待充）;false = 满瓶归还（直接 Available）
    #[instrument(skip(self, cylinder_ids, snapshot), fields(batch = cylinder_ids.len()))]
    pub fn return_cylinders(
        &self,
        cylinder_ids: &[String],
        snapshot: &[Cylinder],
        empty: bool,
        now: DateTime<Utc>,
    ) -> EngineResult<BatchOutcome> {
        if cylinder_ids.is_empty() {
            return Ok(BatchOutcome::NoOp(NoOpReason::EmptySelection));
        }

        let to = if empty {
            CylinderStatus::EmptyRefill
        } else {
            CylinderStatus::Available
        };
        let location = self.settings.default_holding_location.clone();

        // 流水记录归还前的持有人
        let member_id = snapshot
            .iter()
            .find(|c| cylinder_ids.contains(&c.cylinder_id))
            .and_then(|c| c.holder_id.clone());

        let updated = transition_batch(
            cylinder_ids,
            snapshot,
            CylinderStatus::Rented,
            to,
            now,
            |c| {
                c.holder_id = None;
                c.last_location = location.clone();
            },
        )?;

        let record = Self::record(TransactionKind::Return, &updated, member_id.as_deref(), now);
        info!(count = updated.len(), empty, "归还批次已生成");

        Ok(BatchOutcome::Committed(BatchCommit {
            from: CylinderStatus::Rented,
            updated,
            record,
        }))
    }

    fn record(
        kind: TransactionKind,
        updated: &[Cylinder],
        member_id: Option<&str>,
        now: DateTime<Utc>,
    ) -> TransactionRecord {
        TransactionRecord {
            transaction_id: uuid::Uuid::new_v4().to_string(),
            kind,
            cylinder_ids: updated.iter().map(|c| c.cylinder_id.clone()).collect(),
            station_id: None,
            member_id: member_id.map(|m| m.to_string()),
            occurred_at: now,
            cost: 0.0,
            note: None,
        }
    }
}

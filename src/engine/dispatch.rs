// ==========================================
// 气瓶充装调度系统 - 送充流程
// ==========================================
// 状态机: EmptyRefill → (dispatch) → Refilling
// 输入: 充装站 + 选中气瓶快照 + 匹配结果
// 输出: 全部气瓶新值 + 一条 REFILL_DISPATCH 流水（按批次,不按瓶）
// 红线: 全有或全无;不直接写库,只计算和返回更新后的实体
// ==========================================

use crate::domain::cylinder::Cylinder;
use crate::domain::station::{RefillPriceRule, RefillStation};
use crate::domain::transaction::TransactionRecord;
use crate::domain::types::{CylinderStatus, TransactionKind};
use crate::engine::cost::{CostAggregator, CostSummary};
use crate::engine::error::EngineResult;
use crate::engine::outcome::{BatchCommit, BatchOutcome, NoOpReason};
use crate::engine::transition::transition_batch;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tracing::{info, instrument};

// ==========================================
// DispatchWorkflow - 送充流程
// ==========================================
pub struct DispatchWorkflow;

impl DispatchWorkflow {
    /// 送充一个批次
    ///
    /// # 参数
    /// - station: 目标充装站（None = 未选择站点）
    /// - cylinder_ids: 选中气瓶ID（应来自匹配引擎的 compatible 集合）
    /// - snapshot: 气瓶快照（需包含全部选中气瓶）
    /// - resolved: 匹配引擎解析出的价格规则,用于计算批次费用
    /// - now: 流转时间
    ///
    /// # 返回
    /// - Ok(Committed): 全部气瓶变为 Refilling,位置为站点名称,附一条流水
    /// - Ok(NoOp): 前置条件不满足（空选择 / 未选站点）,不产生任何变更
    /// - Err: 调用方契约违反（未知气瓶 / 状态不是 EmptyRefill）,不产生任何变更
    #[instrument(skip_all, fields(batch = cylinder_ids.len()))]
    pub fn dispatch(
        station: Option<&RefillStation>,
        cylinder_ids: &[String],
        snapshot: &[Cylinder],
        resolved: &HashMap<String, RefillPriceRule>,
        now: DateTime<Utc>,
    ) -> EngineResult<BatchOutcome> {
        if cylinder_ids.is_empty() {
            return Ok(BatchOutcome::NoOp(NoOpReason::EmptySelection));
        }
        let station = match station {
            Some(s) => s,
            None => return Ok(BatchOutcome::NoOp(NoOpReason::StationNotSelected)),
        };

        let updated = transition_batch(
            cylinder_ids,
            snapshot,
            CylinderStatus::EmptyRefill,
            CylinderStatus::Refilling,
            now,
            |c| {
                c.last_location = station.name.clone();
                c.holder_id = None;
            },
        )?;

        let summary: CostSummary = CostAggregator::summarize(cylinder_ids, snapshot, resolved);

        let record = TransactionRecord {
            transaction_id: uuid::Uuid::new_v4().to_string(),
            kind: TransactionKind::RefillDispatch,
            cylinder_ids: updated.iter().map(|c| c.cylinder_id.clone()).collect(),
            station_id: Some(station.station_id.clone()),
            member_id: None,
            occurred_at: now,
            cost: summary.total,
            note: None,
        };

        info!(
            station_id = %station.station_id,
            count = updated.len(),
            total = summary.total,
            "送充批次已生成"
        );

        Ok(BatchOutcome::Committed(BatchCommit {
            from: CylinderStatus::EmptyRefill,
            updated,
            record,
        }))
    }
}

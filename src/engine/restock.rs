// ==========================================
// 气瓶充装调度系统 - 充装回库流程
// ==========================================
// 状态机: Refilling → (restock) → Available
// 费用: 外部整批录入,不拆分到单瓶 / SKU 组
// 红线: 费用缺失或无法解析按 0 处理,不拒绝
// ==========================================

use crate::config::RefillSettings;
use crate::domain::cylinder::Cylinder;
use crate::domain::transaction::TransactionRecord;
use crate::domain::types::{CylinderStatus, TransactionKind};
use crate::engine::error::EngineResult;
use crate::engine::outcome::{BatchCommit, BatchOutcome, NoOpReason};
use crate::engine::transition::transition_batch;
use chrono::{DateTime, Utc};
use tracing::{info, instrument, warn};

/// 解析操作员录入的批次费用
///
/// # 规则
/// - 空白 / 非数字 / NaN / 无穷 → 0
/// - 允许千分位逗号与下划线（"90,000" → 90000）
pub fn parse_cost(input: &str) -> f64 {
    let cleaned: String = input
        .trim()
        .chars()
        .filter(|c| *c != ',' && *c != '_')
        .collect();
    match cleaned.parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => {
            if !cleaned.is_empty() {
                warn!(input, "回库费用无法解析,按 0 处理");
            }
            0.0
        }
    }
}

// ==========================================
// RestockWorkflow - 充装回库流程
// ==========================================
pub struct RestockWorkflow {
    settings: RefillSettings,
}

impl RestockWorkflow {
    pub fn new(settings: RefillSettings) -> Self {
        Self { settings }
    }

    /// 回库一个批次
    ///
    /// # 参数
    /// - cylinder_ids: 选中气瓶ID
    /// - snapshot: 气瓶快照（需包含全部选中气瓶）
    /// - total_cost: 批次总费用（≥ 0）
    /// - station_id: 来源充装站（已知时记录）
    /// - now: 流转时间
    ///
    /// # 返回
    /// - Ok(Committed): 全部气瓶变为 Available,位置恢复默认在库位置,附一条流水
    /// - Ok(NoOp): 空选择 / 负费用
    /// - Err: 调用方契约违反（未知气瓶 / 状态不是 Refilling）
    #[instrument(skip(self, cylinder_ids, snapshot), fields(batch = cylinder_ids.len()))]
    pub fn restock(
        &self,
        cylinder_ids: &[String],
        snapshot: &[Cylinder],
        total_cost: f64,
        station_id: Option<&str>,
        now: DateTime<Utc>,
    ) -> EngineResult<BatchOutcome> {
        if cylinder_ids.is_empty() {
            return Ok(BatchOutcome::NoOp(NoOpReason::EmptySelection));
        }
        if total_cost < 0.0 {
            return Ok(BatchOutcome::NoOp(NoOpReason::NegativeCost));
        }
        let total_cost = if total_cost.is_finite() { total_cost } else { 0.0 };

        let location = self.settings.default_holding_location.clone();
        let updated = transition_batch(
            cylinder_ids,
            snapshot,
            CylinderStatus::Refilling,
            CylinderStatus::Available,
            now,
            |c| {
                c.last_location = location.clone();
                c.holder_id = None;
            },
        )?;

        let record = TransactionRecord {
            transaction_id: uuid::Uuid::new_v4().to_string(),
            kind: TransactionKind::RefillReceipt,
            cylinder_ids: updated.iter().map(|c| c.cylinder_id.clone()).collect(),
            station_id: station_id.map(|s| s.to_string()),
            member_id: None,
            occurred_at: now,
            cost: total_cost,
            note: None,
        };

        info!(count = updated.len(), total_cost, "回库批次已生成");

        Ok(BatchOutcome::Committed(BatchCommit {
            from: CylinderStatus::Refilling,
            updated,
            record,
        }))
    }

    /// 以操作员原始输入回库（费用按 parse_cost 规则转换）
    pub fn restock_with_input(
        &self,
        cylinder_ids: &[String],
        snapshot: &[Cylinder],
        cost_input: &str,
        station_id: Option<&str>,
        now: DateTime<Utc>,
    ) -> EngineResult<BatchOutcome> {
        self.restock(cylinder_ids, snapshot, parse_cost(cost_input), station_id, now)
    }
}

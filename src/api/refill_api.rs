// ==========================================
// 气瓶充装调度系统 - 送充/回库 API
// ==========================================
// 职责: 组装 仓储读取 → 匹配/汇总/流转引擎 → 事务提交 → 回读
// 红线: 引擎只接收本次操作涉及的站点、规则与候选气瓶,不接收全量数据
// ==========================================

use crate::api::ack::{commit_outcome, BatchAck};
use crate::api::error::{config_error, ApiError, ApiResult};
use crate::config::{ConfigManager, RefillConfigReader};
use crate::domain::cylinder::Cylinder;
use crate::domain::station::RefillStation;
use crate::domain::types::CylinderStatus;
use crate::engine::{
    BatchOutcome, CompatibilityMatcher, CostAggregator, CostSummary, DispatchWorkflow,
    MatchResult, NoOpReason, RestockLine, RestockWorkflow,
};
use crate::repository::{
    CylinderRepository, PriceRuleRepository, StationRepository, TransactionRepository,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};

// ==========================================
// 响应结构
// ==========================================

/// 送充预览: 站点 + 全部待充气瓶的匹配结果 + 按兼容集合计算的费用
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchPreview {
    pub station: RefillStation,
    pub candidate_count: usize,
    pub matched: MatchResult,
    pub summary: CostSummary,
}

/// 充装中气瓶概览（回库前核对用）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefillingOverview {
    pub cylinders: Vec<Cylinder>,
    pub lines: Vec<RestockLine>,
}

// ==========================================
// RefillApi
// ==========================================
pub struct RefillApi {
    cylinder_repo: Arc<CylinderRepository>,
    station_repo: Arc<StationRepository>,
    price_rule_repo: Arc<PriceRuleRepository>,
    transaction_repo: Arc<TransactionRepository>,
    config: Arc<ConfigManager>,
}

impl RefillApi {
    pub fn new(
        cylinder_repo: Arc<CylinderRepository>,
        station_repo: Arc<StationRepository>,
        price_rule_repo: Arc<PriceRuleRepository>,
        transaction_repo: Arc<TransactionRepository>,
        config: Arc<ConfigManager>,
    ) -> Self {
        Self {
            cylinder_repo,
            station_repo,
            price_rule_repo,
            transaction_repo,
            config,
        }
    }

    fn load_station(&self, station_id: &str) -> ApiResult<RefillStation> {
        self.station_repo
            .find_by_id(station_id)?
            .ok_or_else(|| ApiError::NotFound(format!("RefillStation(id={})不存在", station_id)))
    }

    fn matcher(&self) -> ApiResult<CompatibilityMatcher> {
        let settings = self.config.load_settings().map_err(config_error)?;
        Ok(CompatibilityMatcher::new(settings))
    }

    /// 站点 + 指定气瓶的匹配结果
    fn match_selection(
        &self,
        station: &RefillStation,
        cylinder_ids: &[String],
    ) -> ApiResult<(Vec<Cylinder>, MatchResult)> {
        let rules = self.price_rule_repo.find_by_station(&station.station_id)?;
        let snapshot = self.cylinder_repo.find_by_ids(cylinder_ids)?;
        let matched = self.matcher()?.match_candidates(station, &rules, &snapshot);
        Ok((snapshot, matched))
    }

    // ==========================================
    // 查询接口
    // ==========================================

    /// 送充预览
    ///
    /// # 参数
    /// - station_id: 选定充装站
    ///
    /// # 返回
    /// - Ok(DispatchPreview): 候选 = 全部 EmptyRefill 气瓶;汇总覆盖全部兼容气瓶
    /// - Err(NotFound): 站点不存在
    #[instrument(skip(self))]
    pub fn preview_dispatch(&self, station_id: &str) -> ApiResult<DispatchPreview> {
        let station = self.load_station(station_id)?;
        let rules = self.price_rule_repo.find_by_station(station_id)?;
        let candidates = self.cylinder_repo.find_by_status(CylinderStatus::EmptyRefill)?;

        let matched = self.matcher()?.match_candidates(&station, &rules, &candidates);
        let summary = CostAggregator::summarize(
            &matched.compatible_ids(),
            &matched.compatible,
            &matched.resolved,
        );

        Ok(DispatchPreview {
            station,
            candidate_count: candidates.len(),
            matched,
            summary,
        })
    }

    /// 指定选择的费用报价（操作员勾选后刷新）
    #[instrument(skip(self, cylinder_ids), fields(batch = cylinder_ids.len()))]
    pub fn quote(&self, station_id: &str, cylinder_ids: &[String]) -> ApiResult<CostSummary> {
        let station = self.load_station(station_id)?;
        let (snapshot, matched) = self.match_selection(&station, cylinder_ids)?;
        Ok(CostAggregator::summarize(
            cylinder_ids,
            &snapshot,
            &matched.resolved,
        ))
    }

    /// 当前充装中的气瓶及分组计数
    pub fn refilling_summary(&self) -> ApiResult<RefillingOverview> {
        let cylinders = self.cylinder_repo.find_by_status(CylinderStatus::Refilling)?;
        let ids: Vec<String> = cylinders.iter().map(|c| c.cylinder_id.clone()).collect();
        let lines = CostAggregator::summarize_restock(&ids, &cylinders);
        Ok(RefillingOverview { cylinders, lines })
    }

    // ==========================================
    // 写入接口
    // ==========================================

    /// 送充
    ///
    /// # 参数
    /// - station_id: 目标充装站（空白 = 未选择）
    /// - cylinder_ids: 选中气瓶（应来自预览的兼容集合）
    ///
    /// # 返回
    /// - Ok(BatchAck::Committed): 提交后回读的气瓶与流水
    /// - Ok(BatchAck::NoOp): 空选择 / 未选站点
    /// - Err: 站点不存在 / 气瓶不存在或状态不是 EmptyRefill（整批未执行）
    #[instrument(skip(self, cylinder_ids), fields(batch = cylinder_ids.len()))]
    pub fn dispatch(&self, station_id: &str, cylinder_ids: &[String]) -> ApiResult<BatchAck> {
        if cylinder_ids.is_empty() {
            return Ok(BatchAck::NoOp {
                reason: NoOpReason::EmptySelection,
            });
        }

        let station = match station_id.trim() {
            "" => None,
            id => Some(self.load_station(id)?),
        };

        let outcome = match &station {
            Some(station) => {
                let (snapshot, matched) = self.match_selection(station, cylinder_ids)?;
                DispatchWorkflow::dispatch(
                    Some(station),
                    cylinder_ids,
                    &snapshot,
                    &matched.resolved,
                    Utc::now(),
                )?
            }
            None => BatchOutcome::NoOp(NoOpReason::StationNotSelected),
        };

        let ack = commit_outcome(&self.cylinder_repo, &self.transaction_repo, outcome)?;
        if let Some(record) = ack.record() {
            info!(
                transaction_id = %record.transaction_id,
                cost = record.cost,
                "送充已提交"
            );
        }
        Ok(ack)
    }

    /// 回库
    ///
    /// # 参数
    /// - cylinder_ids: 选中气瓶（须全部为 Refilling）
    /// - cost_input: 操作员录入的整批费用（无法解析按 0 处理）
    /// - station_id: 来源充装站（可选,填写时须存在）
    #[instrument(skip(self, cylinder_ids), fields(batch = cylinder_ids.len()))]
    pub fn restock(
        &self,
        cylinder_ids: &[String],
        cost_input: &str,
        station_id: Option<&str>,
    ) -> ApiResult<BatchAck> {
        if cylinder_ids.is_empty() {
            return Ok(BatchAck::NoOp {
                reason: NoOpReason::EmptySelection,
            });
        }

        let station_id = station_id.map(str::trim).filter(|s| !s.is_empty());
        if let Some(id) = station_id {
            self.load_station(id)?;
        }

        let settings = self.config.load_settings().map_err(config_error)?;
        let snapshot = self.cylinder_repo.find_by_ids(cylinder_ids)?;
        let outcome = RestockWorkflow::new(settings).restock_with_input(
            cylinder_ids,
            &snapshot,
            cost_input,
            station_id,
            Utc::now(),
        )?;

        let ack = commit_outcome(&self.cylinder_repo, &self.transaction_repo, outcome)?;
        if let Some(record) = ack.record() {
            info!(
                transaction_id = %record.transaction_id,
                cost = record.cost,
                "回库已提交"
            );
        }
        Ok(ack)
    }
}

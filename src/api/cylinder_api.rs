// ==========================================
// 气瓶充装调度系统 - 气瓶台账 API
// ==========================================
// 职责: 台账检索/分页、出租、归还、流水查询
// ==========================================

use crate::api::ack::{commit_outcome, BatchAck};
use crate::api::error::{config_error, ApiError, ApiResult};
use crate::config::{ConfigManager, RefillConfigReader};
use crate::domain::cylinder::Cylinder;
use crate::domain::transaction::TransactionRecord;
use crate::domain::types::CylinderStatus;
use crate::engine::RentalWorkflow;
use crate::repository::{CylinderQuery, CylinderRepository, Page, TransactionRepository};
use chrono::Utc;
use std::sync::Arc;
use tracing::instrument;

/// 单页上限
const MAX_PAGE_SIZE: usize = 500;

pub struct CylinderApi {
    cylinder_repo: Arc<CylinderRepository>,
    transaction_repo: Arc<TransactionRepository>,
    config: Arc<ConfigManager>,
}

impl CylinderApi {
    pub fn new(
        cylinder_repo: Arc<CylinderRepository>,
        transaction_repo: Arc<TransactionRepository>,
        config: Arc<ConfigManager>,
    ) -> Self {
        Self {
            cylinder_repo,
            transaction_repo,
            config,
        }
    }

    fn rental(&self) -> ApiResult<RentalWorkflow> {
        let settings = self.config.load_settings().map_err(config_error)?;
        Ok(RentalWorkflow::new(settings))
    }

    // ==========================================
    // 查询接口
    // ==========================================

    /// 台账检索（钢印编号升序,返回当页 + 精确总数）
    ///
    /// # 参数
    /// - query: 状态过滤 / 关键字 / offset / limit（limit 为 0 或超过上限时报错）
    pub fn search(&self, query: &CylinderQuery) -> ApiResult<Page<Cylinder>> {
        if let Some(limit) = query.limit {
            if limit == 0 || limit > MAX_PAGE_SIZE {
                return Err(ApiError::InvalidInput(format!(
                    "limit 必须在 1-{} 之间",
                    MAX_PAGE_SIZE
                )));
            }
        }
        Ok(self.cylinder_repo.search(query)?)
    }

    pub fn get(&self, cylinder_id: &str) -> ApiResult<Cylinder> {
        self.cylinder_repo
            .find_by_id(cylinder_id)?
            .ok_or_else(|| ApiError::NotFound(format!("Cylinder(id={})不存在", cylinder_id)))
    }

    /// 各状态数量
    pub fn status_counts(&self) -> ApiResult<Vec<(CylinderStatus, usize)>> {
        Ok(self.cylinder_repo.count_by_status()?)
    }

    /// 最近流水
    pub fn recent_transactions(&self, limit: usize) -> ApiResult<Vec<TransactionRecord>> {
        Ok(self.transaction_repo.list_recent(limit.min(MAX_PAGE_SIZE))?)
    }

    // ==========================================
    // 写入接口
    // ==========================================

    /// 出租给会员（Available → Rented）
    #[instrument(skip(self, cylinder_ids), fields(batch = cylinder_ids.len()))]
    pub fn rent(&self, member_id: &str, cylinder_ids: &[String]) -> ApiResult<BatchAck> {
        let snapshot = self.cylinder_repo.find_by_ids(cylinder_ids)?;
        let outcome = self
            .rental()?
            .rent(member_id, cylinder_ids, &snapshot, Utc::now())?;
        commit_outcome(&self.cylinder_repo, &self.transaction_repo, outcome)
    }

    /// 归还（Rented → EmptyRefill 空瓶 / Available 满瓶）
    #[instrument(skip(self, cylinder_ids), fields(batch = cylinder_ids.len()))]
    pub fn return_cylinders(&self, cylinder_ids: &[String], empty: bool) -> ApiResult<BatchAck> {
        let snapshot = self.cylinder_repo.find_by_ids(cylinder_ids)?;
        let outcome = self
            .rental()?
            .return_cylinders(cylinder_ids, &snapshot, empty, Utc::now())?;
        commit_outcome(&self.cylinder_repo, &self.transaction_repo, outcome)
    }

    /// 删除气瓶档案
    #[instrument(skip(self))]
    pub fn delete(&self, cylinder_id: &str) -> ApiResult<()> {
        Ok(self.cylinder_repo.delete(cylinder_id)?)
    }
}

// ==========================================
// 气瓶充装调度系统 - 充装站与价格规则 API
// ==========================================
// 职责: 充装站 CRUD + 价格规则维护（声明顺序即匹配顺序）
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::domain::station::{RefillPriceRule, RefillStation};
use crate::domain::types::{CylinderSize, GasType};
use crate::repository::{PriceRuleRepository, StationRepository};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};

/// 充装站编辑表单
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StationInput {
    pub name: String,
    pub address: Option<String>,
    pub contact_name: Option<String>,
    pub phone: Option<String>,
}

/// 价格规则编辑表单
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceRuleInput {
    pub gas_type: GasType,
    pub size: CylinderSize,
    pub sku_filter: Option<String>, // 空白 = 通用规则
    pub unit_price: f64,
}

/// 空白可选字段归一为 None
fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn validate_station(input: &StationInput) -> ApiResult<()> {
    if input.name.trim().is_empty() {
        return Err(ApiError::InvalidInput("充装站名称不能为空".to_string()));
    }
    Ok(())
}

fn validate_rule(input: &PriceRuleInput) -> ApiResult<()> {
    if !input.unit_price.is_finite() || input.unit_price < 0.0 {
        return Err(ApiError::InvalidInput(format!(
            "单价必须为非负数: {}",
            input.unit_price
        )));
    }
    Ok(())
}

pub struct StationApi {
    station_repo: Arc<StationRepository>,
    price_rule_repo: Arc<PriceRuleRepository>,
}

impl StationApi {
    pub fn new(
        station_repo: Arc<StationRepository>,
        price_rule_repo: Arc<PriceRuleRepository>,
    ) -> Self {
        Self {
            station_repo,
            price_rule_repo,
        }
    }

    // ==========================================
    // 充装站
    // ==========================================

    pub fn list_stations(&self) -> ApiResult<Vec<RefillStation>> {
        Ok(self.station_repo.list_all()?)
    }

    pub fn get_station(&self, station_id: &str) -> ApiResult<RefillStation> {
        self.station_repo
            .find_by_id(station_id)?
            .ok_or_else(|| ApiError::NotFound(format!("RefillStation(id={})不存在", station_id)))
    }

    #[instrument(skip(self, input), fields(name = %input.name))]
    pub fn create_station(&self, input: StationInput) -> ApiResult<RefillStation> {
        validate_station(&input)?;

        let station = RefillStation {
            station_id: uuid::Uuid::new_v4().to_string(),
            name: input.name.trim().to_string(),
            address: non_blank(input.address),
            contact_name: non_blank(input.contact_name),
            phone: non_blank(input.phone),
        };
        self.station_repo.insert(&station)?;

        info!(station_id = %station.station_id, "充装站已创建");
        self.get_station(&station.station_id)
    }

    #[instrument(skip(self, input))]
    pub fn update_station(&self, station_id: &str, input: StationInput) -> ApiResult<RefillStation> {
        validate_station(&input)?;

        let station = RefillStation {
            station_id: station_id.to_string(),
            name: input.name.trim().to_string(),
            address: non_blank(input.address),
            contact_name: non_blank(input.contact_name),
            phone: non_blank(input.phone),
        };
        self.station_repo.update(&station)?;
        self.get_station(station_id)
    }

    /// 删除充装站（其价格规则随之删除）
    #[instrument(skip(self))]
    pub fn delete_station(&self, station_id: &str) -> ApiResult<()> {
        self.station_repo.delete(station_id)?;
        info!("充装站已删除");
        Ok(())
    }

    // ==========================================
    // 价格规则
    // ==========================================

    /// 站点规则（声明顺序）
    pub fn list_rules(&self, station_id: &str) -> ApiResult<Vec<RefillPriceRule>> {
        Ok(self.price_rule_repo.find_by_station(station_id)?)
    }

    /// 追加规则到站点规则表末尾
    #[instrument(skip(self, input))]
    pub fn add_rule(&self, station_id: &str, input: PriceRuleInput) -> ApiResult<RefillPriceRule> {
        validate_rule(&input)?;
        self.get_station(station_id)?;

        let rule = RefillPriceRule {
            rule_id: uuid::Uuid::new_v4().to_string(),
            station_id: station_id.to_string(),
            gas_type: input.gas_type,
            size: input.size,
            sku_filter: non_blank(input.sku_filter),
            unit_price: input.unit_price,
            seq: 0,
        };
        Ok(self.price_rule_repo.append(&rule)?)
    }

    /// 修改规则内容（保留原声明位置）
    #[instrument(skip(self, input))]
    pub fn update_rule(&self, rule_id: &str, input: PriceRuleInput) -> ApiResult<RefillPriceRule> {
        validate_rule(&input)?;

        let existing = self
            .price_rule_repo
            .find_by_id(rule_id)?
            .ok_or_else(|| ApiError::NotFound(format!("RefillPriceRule(id={})不存在", rule_id)))?;

        let rule = RefillPriceRule {
            gas_type: input.gas_type,
            size: input.size,
            sku_filter: non_blank(input.sku_filter),
            unit_price: input.unit_price,
            ..existing
        };
        self.price_rule_repo.update(&rule)?;
        Ok(rule)
    }

    pub fn delete_rule(&self, rule_id: &str) -> ApiResult<()> {
        Ok(self.price_rule_repo.delete(rule_id)?)
    }

    /// 整体替换站点规则表（入参顺序即新的声明顺序）
    #[instrument(skip(self, inputs), fields(rules = inputs.len()))]
    pub fn replace_rules(
        &self,
        station_id: &str,
        inputs: Vec<PriceRuleInput>,
    ) -> ApiResult<Vec<RefillPriceRule>> {
        for input in &inputs {
            validate_rule(input)?;
        }
        self.get_station(station_id)?;

        let rules: Vec<RefillPriceRule> = inputs
            .into_iter()
            .map(|input| RefillPriceRule {
                rule_id: uuid::Uuid::new_v4().to_string(),
                station_id: station_id.to_string(),
                gas_type: input.gas_type,
                size: input.size,
                sku_filter: non_blank(input.sku_filter),
                unit_price: input.unit_price,
                seq: 0,
            })
            .collect();

        Ok(self.price_rule_repo.replace_for_station(station_id, &rules)?)
    }
}

// ==========================================
// 气瓶充装调度系统 - 充装站与价格规则
// ==========================================
// 对齐: schema refill_station / refill_price_rule 表
// 红线: 删除充装站时级联删除其全部价格规则
// ==========================================

use crate::domain::types::{CylinderSize, GasType};
use serde::{Deserialize, Serialize};

// ==========================================
// RefillStation - 充装站（外部供应商）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefillStation {
    pub station_id: String,
    pub name: String,
    pub address: Option<String>,
    pub contact_name: Option<String>,
    pub phone: Option<String>,
}

// ==========================================
// RefillPriceRule - 充装价格规则
// ==========================================
// 同一站点允许多条 (gas_type, size) 相同的规则,以 sku_filter 区分不同 SKU 价格
// seq 为声明顺序,匹配时同级命中取先声明者
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefillPriceRule {
    pub rule_id: String,
    pub station_id: String,
    pub gas_type: GasType,
    pub size: CylinderSize,
    pub sku_filter: Option<String>, // None / 空串 = 通用规则
    pub unit_price: f64,
    pub seq: i64,
}

impl RefillPriceRule {
    /// 规范化后的 SKU 过滤串（空白视为无过滤）
    pub fn effective_filter(&self) -> Option<&str> {
        self.sku_filter
            .as_deref()
            .map(str::trim)
            .filter(|f| !f.is_empty())
    }

    /// 是否为通用规则（不限 SKU）
    pub fn is_generic(&self) -> bool {
        self.effective_filter().is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(filter: Option<&str>) -> RefillPriceRule {
        RefillPriceRule {
            rule_id: "r1".to_string(),
            station_id: "s1".to_string(),
            gas_type: GasType::Oxygen,
            size: CylinderSize::Large,
            sku_filter: filter.map(|f| f.to_string()),
            unit_price: 100.0,
            seq: 0,
        }
    }

    #[test]
    fn test_blank_filter_is_generic() {
        assert!(rule(None).is_generic());
        assert!(rule(Some("")).is_generic());
        assert!(rule(Some("   ")).is_generic());
        assert!(!rule(Some("OXY")).is_generic());
        assert_eq!(rule(Some(" OXY ")).effective_filter(), Some("OXY"));
    }
}

// ==========================================
// 气瓶充装调度系统 - 充装站兼容性匹配引擎
// ==========================================
// 职责: 给定充装站 + 候选空瓶,判定接收与否并解析适用价格规则
// 输入: 站点、站点价格规则、候选气瓶（调用方已过滤为 EmptyRefill）
// 输出: 兼容气瓶（保序子集）+ 每瓶价格规则 + 拒收原因
// 红线: 不重复按状态过滤;不直接读写库;所有拒收必须输出 reason
// ==========================================

use crate::config::RefillSettings;
use crate::domain::cylinder::Cylinder;
use crate::domain::station::{RefillPriceRule, RefillStation};
use crate::engine::rule_core::PriceRuleBook;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, instrument};

// ==========================================
// RejectReason - 拒收原因
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RejectReason {
    /// 站点无该 (气种, 规格) 的任何规则
    NoRuleForGasSize,
    /// 仅有专属 SKU 规则,且均未命中该气瓶 SKU 前缀
    SkuFilterMismatch,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRejection {
    pub cylinder_id: String,
    pub reason: RejectReason,
}

// ==========================================
// MatchResult - 匹配结果
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    /// 兼容气瓶（候选集的保序子集）
    pub compatible: Vec<Cylinder>,
    /// cylinder_id → 解析到的价格规则（compatible 中每瓶必有一条）
    pub resolved: HashMap<String, RefillPriceRule>,
    /// 被拒收的候选及原因
    pub rejections: Vec<MatchRejection>,
}

impl MatchResult {
    pub fn compatible_ids(&self) -> Vec<String> {
        self.compatible.iter().map(|c| c.cylinder_id.clone()).collect()
    }

    pub fn is_compatible(&self, cylinder_id: &str) -> bool {
        self.resolved.contains_key(cylinder_id)
    }
}

// ==========================================
// CompatibilityMatcher - 兼容性匹配引擎
// ==========================================
pub struct CompatibilityMatcher {
    settings: RefillSettings,
}

impl CompatibilityMatcher {
    pub fn new(settings: RefillSettings) -> Self {
        Self { settings }
    }

    /// 匹配候选气瓶
    ///
    /// # 参数
    /// - station: 选定充装站
    /// - price_rules: 价格规则（允许混入其他站点规则,按站点过滤;保留声明顺序）
    /// - candidates: 候选气瓶（调用方保证状态为 EmptyRefill）
    ///
    /// # 返回
    /// - MatchResult: 站点无规则时 compatible 为空（不是错误）
    #[instrument(skip(self, station, price_rules, candidates), fields(station_id = %station.station_id, candidates = candidates.len()))]
    pub fn match_candidates(
        &self,
        station: &RefillStation,
        price_rules: &[RefillPriceRule],
        candidates: &[Cylinder],
    ) -> MatchResult {
        let book = PriceRuleBook::compile(
            &station.station_id,
            price_rules,
            self.settings.sku_match_case_sensitive,
        );

        let mut result = MatchResult::default();

        for cylinder in candidates {
            match book.resolve(cylinder.gas_type, cylinder.size, cylinder.sku_prefix()) {
                Some(entry) => {
                    result
                        .resolved
                        .insert(cylinder.cylinder_id.clone(), entry.rule.clone());
                    result.compatible.push(cylinder.clone());
                }
                None => {
                    let reason = if book.has_rules_for(cylinder.gas_type, cylinder.size) {
                        RejectReason::SkuFilterMismatch
                    } else {
                        RejectReason::NoRuleForGasSize
                    };
                    result.rejections.push(MatchRejection {
                        cylinder_id: cylinder.cylinder_id.clone(),
                        reason,
                    });
                }
            }
        }

        debug!(
            compatible = result.compatible.len(),
            rejected = result.rejections.len(),
            "充装站匹配完成"
        );

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{CylinderSize, CylinderStatus, GasType};
    use chrono::Utc;

    fn station(id: &str) -> RefillStation {
        RefillStation {
            station_id: id.to_string(),
            name: format!("Vendor {}", id),
            address: None,
            contact_name: None,
            phone: None,
        }
    }

    fn cylinder(id: &str, serial: &str, gas: GasType, size: CylinderSize) -> Cylinder {
        Cylinder {
            cylinder_id: id.to_string(),
            serial_code: serial.to_string(),
            gas_type: gas,
            size,
            status: CylinderStatus::EmptyRefill,
            holder_id: None,
            last_location: "Main Warehouse".to_string(),
            updated_at: Utc::now(),
        }
    }

    fn rule(
        id: &str,
        station_id: &str,
        gas: GasType,
        size: CylinderSize,
        filter: Option<&str>,
        price: f64,
    ) -> RefillPriceRule {
        RefillPriceRule {
            rule_id: id.to_string(),
            station_id: station_id.to_string(),
            gas_type: gas,
            size,
            sku_filter: filter.map(|f| f.to_string()),
            unit_price: price,
            seq: 0,
        }
    }

    fn matcher() -> CompatibilityMatcher {
        CompatibilityMatcher::new(RefillSettings::default())
    }

    #[test]
    fn test_sku_and_generic_rules_resolve_separately() {
        let v = station("V");
        let rules = vec![
            rule("oxy", "V", GasType::Oxygen, CylinderSize::Large, Some("OXY"), 50000.0),
            rule("gen", "V", GasType::Oxygen, CylinderSize::Large, None, 40000.0),
        ];
        let candidates = vec![
            cylinder("c1", "OXY-1", GasType::Oxygen, CylinderSize::Large),
            cylinder("c2", "ABC-2", GasType::Oxygen, CylinderSize::Large),
        ];

        let result = matcher().match_candidates(&v, &rules, &candidates);

        assert_eq!(result.compatible_ids(), vec!["c1", "c2"]);
        assert_eq!(result.resolved["c1"].unit_price, 50000.0);
        assert_eq!(result.resolved["c2"].unit_price, 40000.0);
        assert!(result.rejections.is_empty());
    }

    #[test]
    fn test_empty_rules_gives_empty_compatible() {
        let candidates = vec![cylinder("c1", "OXY-1", GasType::Oxygen, CylinderSize::Large)];
        let result = matcher().match_candidates(&station("V"), &[], &candidates);
        assert!(result.compatible.is_empty());
        assert_eq!(result.rejections[0].reason, RejectReason::NoRuleForGasSize);
    }

    #[test]
    fn test_rules_of_other_station_are_ignored() {
        let rules = vec![rule("w", "W", GasType::Oxygen, CylinderSize::Large, None, 1.0)];
        let candidates = vec![cylinder("c1", "OXY-1", GasType::Oxygen, CylinderSize::Large)];
        let result = matcher().match_candidates(&station("V"), &rules, &candidates);
        assert!(result.compatible.is_empty());
    }

    #[test]
    fn test_sku_only_rule_rejects_other_prefix_with_reason() {
        let rules = vec![
            rule("oxy", "V", GasType::Oxygen, CylinderSize::Large, Some("OXY"), 50000.0),
            // 其他气种的通用规则不能让不匹配的氧气瓶通过
            rule("ar", "V", GasType::Argon, CylinderSize::Large, None, 1.0),
        ];
        let candidates = vec![cylinder("c2", "ABC-2", GasType::Oxygen, CylinderSize::Large)];
        let result = matcher().match_candidates(&station("V"), &rules, &candidates);
        assert!(result.compatible.is_empty());
        assert!(result.resolved.is_empty());
        assert_eq!(result.rejections[0].reason, RejectReason::SkuFilterMismatch);
    }

    #[test]
    fn test_compatible_preserves_candidate_order() {
        let rules = vec![
            rule("a", "V", GasType::Argon, CylinderSize::Small, None, 1.0),
            rule("o", "V", GasType::Oxygen, CylinderSize::Small, None, 2.0),
        ];
        let candidates = vec![
            cylinder("c3", "O-3", GasType::Oxygen, CylinderSize::Small),
            cylinder("c1", "N-1", GasType::Nitrogen, CylinderSize::Small),
            cylinder("c2", "A-2", GasType::Argon, CylinderSize::Small),
        ];
        let result = matcher().match_candidates(&station("V"), &rules, &candidates);
        assert_eq!(result.compatible_ids(), vec!["c3", "c2"]);
    }

    #[test]
    fn test_compatible_never_contains_gas_size_without_rules() {
        // 每个兼容气瓶必须在该站点有同 (气种, 规格) 的规则
        let rules = vec![
            rule("r1", "V", GasType::Oxygen, CylinderSize::Large, Some("OX"), 1.0),
            rule("r2", "V", GasType::Co2, CylinderSize::Cubic6, None, 2.0),
            rule("r3", "V", GasType::Argon, CylinderSize::Medium, Some("AR"), 3.0),
        ];
        let mut candidates = Vec::new();
        for (i, gas) in GasType::ALL.iter().enumerate() {
            for (j, size) in CylinderSize::ALL.iter().enumerate() {
                for prefix in ["OX", "AR", "ZZ"] {
                    candidates.push(cylinder(
                        &format!("c{}-{}-{}", i, j, prefix),
                        &format!("{}-{}{}", prefix, i, j),
                        *gas,
                        *size,
                    ));
                }
            }
        }

        let result = matcher().match_candidates(&station("V"), &rules, &candidates);

        for c in &result.compatible {
            assert!(rules
                .iter()
                .any(|r| r.gas_type == c.gas_type && r.size == c.size));
            assert!(result.resolved.contains_key(&c.cylinder_id));
        }
        assert_eq!(
            result.compatible.len() + result.rejections.len(),
            candidates.len()
        );
    }
}

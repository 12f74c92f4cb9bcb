// ==========================================
// 气瓶充装调度系统 - 价格规则簿（纯函数）
// ==========================================
// 职责: 把站点价格规则编译为有序的 (SKU 谓词, 价格规则) 列表
// 优先级: 同 (气种, 规格) 下,专属 SKU 规则 > 通用规则;同级取声明顺序第一条
// 红线: 无状态、无副作用、无 I/O 操作
// ==========================================

use crate::domain::station::RefillPriceRule;
use crate::domain::types::{CylinderSize, GasType, PriceBasis};

// ==========================================
// SkuPredicate - SKU 前缀谓词
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkuPredicate {
    /// 通用规则: 接受任意 SKU
    Generic,
    /// SKU 前缀包含过滤串（子串匹配）
    PrefixContains(String),
}

impl SkuPredicate {
    /// 由价格规则构造谓词
    ///
    /// # 参数
    /// - rule: 价格规则
    /// - case_sensitive: 是否区分大小写（不区分时统一转大写保存）
    pub fn from_rule(rule: &RefillPriceRule, case_sensitive: bool) -> Self {
        match rule.effective_filter() {
            None => SkuPredicate::Generic,
            Some(filter) if case_sensitive => SkuPredicate::PrefixContains(filter.to_string()),
            Some(filter) => SkuPredicate::PrefixContains(filter.to_uppercase()),
        }
    }

    pub fn is_generic(&self) -> bool {
        matches!(self, SkuPredicate::Generic)
    }

    /// 判定 SKU 前缀是否满足谓词
    ///
    /// # 参数
    /// - sku_prefix: 已按大小写口径规范化的 SKU 前缀
    pub fn matches(&self, sku_prefix: &str) -> bool {
        match self {
            SkuPredicate::Generic => true,
            SkuPredicate::PrefixContains(filter) => sku_prefix.contains(filter.as_str()),
        }
    }
}

// ==========================================
// PriceRuleEntry - 规则簿条目
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct PriceRuleEntry {
    pub predicate: SkuPredicate,
    pub rule: RefillPriceRule,
}

impl PriceRuleEntry {
    /// 费用汇总用的计价依据
    pub fn basis(&self) -> PriceBasis {
        match self.rule.effective_filter() {
            Some(filter) => PriceBasis::Sku(filter.to_string()),
            None => PriceBasis::Generic,
        }
    }

    fn applies_to(&self, gas_type: GasType, size: CylinderSize) -> bool {
        self.rule.gas_type == gas_type && self.rule.size == size
    }
}

// ==========================================
// PriceRuleBook - 单站点的有序规则簿
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct PriceRuleBook {
    station_id: String,
    entries: Vec<PriceRuleEntry>,
    case_sensitive: bool,
}

impl PriceRuleBook {
    /// 编译规则簿
    ///
    /// # 参数
    /// - station_id: 目标充装站
    /// - rules: 价格规则（可含其他站点规则,此处过滤;保留调用方迭代顺序）
    /// - case_sensitive: SKU 匹配是否区分大小写
    pub fn compile(station_id: &str, rules: &[RefillPriceRule], case_sensitive: bool) -> Self {
        let entries = rules
            .iter()
            .filter(|r| r.station_id == station_id)
            .map(|r| PriceRuleEntry {
                predicate: SkuPredicate::from_rule(r, case_sensitive),
                rule: r.clone(),
            })
            .collect();

        Self {
            station_id: station_id.to_string(),
            entries,
            case_sensitive,
        }
    }

    pub fn station_id(&self) -> &str {
        &self.station_id
    }

    pub fn entries(&self) -> &[PriceRuleEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 该站点是否存在 (气种, 规格) 的任意规则
    pub fn has_rules_for(&self, gas_type: GasType, size: CylinderSize) -> bool {
        self.entries.iter().any(|e| e.applies_to(gas_type, size))
    }

    /// 解析适用的价格规则
    ///
    /// # 规则
    /// 1. 同 (气种, 规格) 下第一条命中的专属 SKU 规则
    /// 2. 否则第一条通用规则
    /// 3. 否则 None（不兼容）
    pub fn resolve(
        &self,
        gas_type: GasType,
        size: CylinderSize,
        sku_prefix: &str,
    ) -> Option<&PriceRuleEntry> {
        let prefix = if self.case_sensitive {
            sku_prefix.to_string()
        } else {
            sku_prefix.to_uppercase()
        };

        let mut generic: Option<&PriceRuleEntry> = None;
        for entry in self.entries.iter().filter(|e| e.applies_to(gas_type, size)) {
            match &entry.predicate {
                SkuPredicate::PrefixContains(_) if entry.predicate.matches(&prefix) => {
                    return Some(entry);
                }
                SkuPredicate::Generic if generic.is_none() => generic = Some(entry),
                _ => {}
            }
        }
        generic
    }
}

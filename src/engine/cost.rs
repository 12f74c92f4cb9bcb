// ==========================================
// 气瓶充装调度系统 - 费用汇总引擎
// ==========================================
// 职责: 对选中气瓶按 (气种, 规格, 计价依据) 分组,计算小计与合计
// 红线: 同气种同规格不同 SKU 价格不得合并;未定价气瓶照常计数,单价记 0
// ==========================================

use crate::domain::cylinder::Cylinder;
use crate::domain::station::RefillPriceRule;
use crate::domain::types::{CylinderSize, GasType, PriceBasis};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

// ==========================================
// CostLine - 送充费用分组行
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostLine {
    pub gas_type: GasType,
    pub size: CylinderSize,
    pub basis: PriceBasis,
    pub count: usize,
    pub unit_price: f64,
    pub subtotal: f64,
}

// ==========================================
// CostSummary - 送充费用汇总
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CostSummary {
    pub lines: Vec<CostLine>,
    pub total: f64,
}

impl CostSummary {
    /// 已选但未定价的气瓶数量
    pub fn unpriced_count(&self) -> usize {
        self.lines
            .iter()
            .filter(|l| l.basis == PriceBasis::Unpriced)
            .map(|l| l.count)
            .sum()
    }

    pub fn cylinder_count(&self) -> usize {
        self.lines.iter().map(|l| l.count).sum()
    }
}

// ==========================================
// RestockLine - 回库分组行（不计价）
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestockLine {
    pub gas_type: GasType,
    pub size: CylinderSize,
    pub count: usize,
}

/// 按选择顺序去重,并只保留快照中存在的气瓶
fn select_in_order<'a>(selected_ids: &[String], cylinders: &'a [Cylinder]) -> Vec<&'a Cylinder> {
    let by_id: HashMap<&str, &Cylinder> = cylinders
        .iter()
        .map(|c| (c.cylinder_id.as_str(), c))
        .collect();

    let mut seen = HashSet::new();
    selected_ids
        .iter()
        .filter(|id| seen.insert(id.as_str()))
        .filter_map(|id| by_id.get(id.as_str()).copied())
        .collect()
}

// ==========================================
// CostAggregator - 费用汇总引擎
// ==========================================
pub struct CostAggregator;

impl CostAggregator {
    /// 送充费用汇总
    ///
    /// # 参数
    /// - selected_ids: 选中的气瓶ID（重复ID只计一次,快照中不存在的ID忽略）
    /// - cylinders: 气瓶快照
    /// - resolved: 匹配引擎输出的 cylinder_id → 价格规则
    ///
    /// # 返回
    /// - CostSummary: 分组按首次出现顺序;total = Σ subtotal
    pub fn summarize(
        selected_ids: &[String],
        cylinders: &[Cylinder],
        resolved: &HashMap<String, RefillPriceRule>,
    ) -> CostSummary {
        let mut lines: Vec<CostLine> = Vec::new();

        for cylinder in select_in_order(selected_ids, cylinders) {
            let (basis, unit_price) = match resolved.get(&cylinder.cylinder_id) {
                Some(rule) => {
                    let basis = match rule.effective_filter() {
                        Some(filter) => PriceBasis::Sku(filter.to_string()),
                        None => PriceBasis::Generic,
                    };
                    (basis, rule.unit_price)
                }
                None => (PriceBasis::Unpriced, 0.0),
            };

            match lines.iter_mut().find(|l| {
                l.gas_type == cylinder.gas_type && l.size == cylinder.size && l.basis == basis
            }) {
                Some(line) => line.count += 1,
                None => lines.push(CostLine {
                    gas_type: cylinder.gas_type,
                    size: cylinder.size,
                    basis,
                    count: 1,
                    unit_price,
                    subtotal: 0.0,
                }),
            }
        }

        for line in &mut lines {
            line.subtotal = line.count as f64 * line.unit_price;
        }
        let total = lines.iter().map(|l| l.subtotal).sum();

        CostSummary { lines, total }
    }

    /// 回库分组汇总（仅按气种+规格计数,费用由外部整批录入）
    pub fn summarize_restock(selected_ids: &[String], cylinders: &[Cylinder]) -> Vec<RestockLine> {
        let mut lines: Vec<RestockLine> = Vec::new();

        for cylinder in select_in_order(selected_ids, cylinders) {
            match lines
                .iter_mut()
                .find(|l| l.gas_type == cylinder.gas_type && l.size == cylinder.size)
            {
                Some(line) => line.count += 1,
                None => lines.push(RestockLine {
                    gas_type: cylinder.gas_type,
                    size: cylinder.size,
                    count: 1,
                }),
            }
        }

        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::CylinderStatus;
    use chrono::Utc;

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

    fn rule(id: &str, filter: Option<&str>, price: f64) -> RefillPriceRule {
        RefillPriceRule {
            rule_id: id.to_string(),
            station_id: "V".to_string(),
            gas_type: GasType::Oxygen,
            size: CylinderSize::Large,
            sku_filter: filter.map(|f| f.to_string()),
            unit_price: price,
            seq: 0,
        }
    }

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_different_sku_prices_are_not_merged() {
        let cylinders = vec![
            cylinder("c1", "OXY-1", GasType::Oxygen, CylinderSize::Large),
            cylinder("c2", "ABC-2", GasType::Oxygen, CylinderSize::Large),
        ];
        let mut resolved = HashMap::new();
        resolved.insert("c1".to_string(), rule("oxy", Some("OXY"), 50000.0));
        resolved.insert("c2".to_string(), rule("gen", None, 40000.0));

        let summary = CostAggregator::summarize(&ids(&["c1", "c2"]), &cylinders, &resolved);

        assert_eq!(summary.lines.len(), 2);
        assert_eq!(summary.lines[0].basis, PriceBasis::Sku("OXY".to_string()));
        assert_eq!(summary.lines[0].count, 1);
        assert_eq!(summary.lines[1].basis, PriceBasis::Generic);
        assert_eq!(summary.lines[1].count, 1);
        assert_eq!(summary.total, 90000.0);
    }

    #[test]
    fn test_unpriced_cylinders_still_counted() {
        let cylinders = vec![
            cylinder("c1", "OXY-1", GasType::Oxygen, CylinderSize::Large),
            cylinder("c2", "N-2", GasType::Nitrogen, CylinderSize::Small),
            cylinder("c3", "N-3", GasType::Nitrogen, CylinderSize::Small),
        ];
        let mut resolved = HashMap::new();
        resolved.insert("c1".to_string(), rule("gen", None, 100.0));

        let summary = CostAggregator::summarize(&ids(&["c1", "c2", "c3"]), &cylinders, &resolved);

        assert_eq!(summary.cylinder_count(), 3);
        assert_eq!(summary.unpriced_count(), 2);
        let unpriced = summary
            .lines
            .iter()
            .find(|l| l.basis == PriceBasis::Unpriced)
            .unwrap();
        assert_eq!(unpriced.unit_price, 0.0);
        assert_eq!(unpriced.subtotal, 0.0);
        assert_eq!(summary.total, 100.0);
    }

    #[test]
    fn test_duplicate_and_unknown_ids_are_ignored() {
        let cylinders = vec![cylinder("c1", "OXY-1", GasType::Oxygen, CylinderSize::Large)];
        let mut resolved = HashMap::new();
        resolved.insert("c1".to_string(), rule("gen", None, 10.0));

        let summary =
            CostAggregator::summarize(&ids(&["c1", "c1", "ghost"]), &cylinders, &resolved);

        assert_eq!(summary.cylinder_count(), 1);
        assert_eq!(summary.total, 10.0);
    }

    #[test]
    fn test_total_equals_sum_of_subtotals_for_any_split() {
        let cylinders: Vec<Cylinder> = (0..6)
            .map(|i| {
                let serial = if i % 2 == 0 { format!("OXY-{}", i) } else { format!("ABC-{}", i) };
                cylinder(&format!("c{}", i), &serial, GasType::Oxygen, CylinderSize::Large)
            })
            .collect();
        let mut resolved = HashMap::new();
        for c in &cylinders {
            let r = if c.sku_prefix() == "OXY" {
                rule("oxy", Some("OXY"), 50000.0)
            } else {
                rule("gen", None, 40000.0)
            };
            resolved.insert(c.cylinder_id.clone(), r);
        }
        let all: Vec<String> = cylinders.iter().map(|c| c.cylinder_id.clone()).collect();

        let whole = CostAggregator::summarize(&all, &cylinders, &resolved);
        let sum_of_lines: f64 = whole.lines.iter().map(|l| l.subtotal).sum();
        assert_eq!(whole.total, sum_of_lines);

        let (left, right) = all.split_at(2);
        let a = CostAggregator::summarize(left, &cylinders, &resolved);
        let b = CostAggregator::summarize(right, &cylinders, &resolved);
        assert_eq!(a.total + b.total, whole.total);
        assert_eq!(whole.total, 3.0 * 50000.0 + 3.0 * 40000.0);
    }

    #[test]
    fn test_restock_groups_by_gas_and_size_only() {
        let cylinders = vec![
            cylinder("c1", "OXY-1", GasType::Oxygen, CylinderSize::Large),
            cylinder("c2", "ABC-2", GasType::Oxygen, CylinderSize::Large),
            cylinder("c3", "AR-3", GasType::Argon, CylinderSize::Small),
        ];
        let lines = CostAggregator::summarize_restock(&ids(&["c1", "c2", "c3"]), &cylinders);
        assert_eq!(
            lines,
            vec![
                RestockLine { gas_type: GasType::Oxygen, size: CylinderSize::Large, count: 2 },
                RestockLine { gas_type: GasType::Argon, size: CylinderSize::Small, count: 1 },
            ]
        );
    }
}

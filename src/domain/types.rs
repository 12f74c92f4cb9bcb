// ==========================================
// 气瓶充装调度系统 - 领域类型定义
// ==========================================
// 职责: 固定枚举（气体种类 / 规格 / 气瓶状态 / 流水类型）
// 红线: 枚举集合固定,导入校验以此为准
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

/// 统一解析口径: 去空白 + 忽略大小写 + 忽略 `_` `-` `/` 分隔符
fn normalize_label(s: &str) -> String {
    s.trim()
        .chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '_' | '-' | '/'))
        .flat_map(|c| c.to_lowercase())
        .collect()
}

// ==========================================
// 气体种类 (Gas Type)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum GasType {
    Oxygen,    // 氧气
    Acetylene, // 乙炔
    Argon,     // 氩气
    #[serde(rename = "CO2")]
    Co2,       // 二氧化碳
    Nitrogen,  // 氮气
}

impl GasType {
    pub const ALL: [GasType; 5] = [
        GasType::Oxygen,
        GasType::Acetylene,
        GasType::Argon,
        GasType::Co2,
        GasType::Nitrogen,
    ];

    /// 规范标签（与导入模板、数据库一致）
    pub fn as_str(&self) -> &'static str {
        match self {
            GasType::Oxygen => "Oxygen",
            GasType::Acetylene => "Acetylene",
            GasType::Argon => "Argon",
            GasType::Co2 => "CO2",
            GasType::Nitrogen => "Nitrogen",
        }
    }

    /// 从字符串解析（不在枚举集合内返回 None）
    pub fn parse(s: &str) -> Option<Self> {
        let key = normalize_label(s);
        Self::ALL
            .into_iter()
            .find(|g| normalize_label(g.as_str()) == key)
    }
}

impl fmt::Display for GasType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 气瓶规格 (Cylinder Size)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CylinderSize {
    Small,
    Medium,
    Large,
    #[serde(rename = "1m3")]
    Cubic1,
    #[serde(rename = "2m3")]
    Cubic2,
    #[serde(rename = "6m3")]
    Cubic6,
}

impl CylinderSize {
    pub const ALL: [CylinderSize; 6] = [
        CylinderSize::Small,
        CylinderSize::Medium,
        CylinderSize::Large,
        CylinderSize::Cubic1,
        CylinderSize::Cubic2,
        CylinderSize::Cubic6,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CylinderSize::Small => "Small",
            CylinderSize::Medium => "Medium",
            CylinderSize::Large => "Large",
            CylinderSize::Cubic1 => "1m3",
            CylinderSize::Cubic2 => "2m3",
            CylinderSize::Cubic6 => "6m3",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        let key = normalize_label(s);
        Self::ALL
            .into_iter()
            .find(|size| normalize_label(size.as_str()) == key)
    }
}

impl fmt::Display for CylinderSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 气瓶状态 (Cylinder Status)
// ==========================================
// 红线: EmptyRefill / Refilling 只能经由充装流程进入
// 流转: Available → Rented → EmptyRefill → Refilling → Available
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CylinderStatus {
    Available,   // 在库可用
    Rented,      // 出租中
    EmptyRefill, // 空瓶待充
    Refilling,   // 充装中（在充装站）
    Damaged,     // 损坏
}

impl CylinderStatus {
    pub const ALL: [CylinderStatus; 5] = [
        CylinderStatus::Available,
        CylinderStatus::Rented,
        CylinderStatus::EmptyRefill,
        CylinderStatus::Refilling,
        CylinderStatus::Damaged,
    ];

    /// 数据库存储口径
    pub fn as_db_str(&self) -> &'static str {
        match self {
            CylinderStatus::Available => "AVAILABLE",
            CylinderStatus::Rented => "RENTED",
            CylinderStatus::EmptyRefill => "EMPTY_REFILL",
            CylinderStatus::Refilling => "REFILLING",
            CylinderStatus::Damaged => "DAMAGED",
        }
    }

    /// 从字符串解析（兼容 "Empty Refill" / "EMPTY_REFILL" / "empty-refill"）
    pub fn parse(s: &str) -> Option<Self> {
        let key = normalize_label(s);
        Self::ALL
            .into_iter()
            .find(|st| normalize_label(st.as_db_str()) == key)
    }
}

impl fmt::Display for CylinderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_db_str())
    }
}

// ==========================================
// 流水类型 (Transaction Kind)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionKind {
    RefillDispatch, // 送充
    RefillReceipt,  // 充装回库
    Rental,         // 出租
    Return,         // 归还
}

impl TransactionKind {
    pub fn as_db_str(&self) -> &'static str {
        match self {
            TransactionKind::RefillDispatch => "REFILL_DISPATCH",
            TransactionKind::RefillReceipt => "REFILL_RECEIPT",
            TransactionKind::Rental => "RENTAL",
            TransactionKind::Return => "RETURN",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "REFILL_DISPATCH" => Some(TransactionKind::RefillDispatch),
            "REFILL_RECEIPT" => Some(TransactionKind::RefillReceipt),
            "RENTAL" => Some(TransactionKind::Rental),
            "RETURN" => Some(TransactionKind::Return),
            _ => None,
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_db_str())
    }
}

// ==========================================
// 计价依据 (Price Basis)
// ==========================================
// 用途: 费用汇总分组键的第三维,保证同气种同规格下不同 SKU 价格不合并
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "filter", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PriceBasis {
    Sku(String), // 命中 SKU 过滤串的专属价
    Generic,     // 通用价（无 SKU 过滤）
    Unpriced,    // 未匹配到价格规则
}

impl fmt::Display for PriceBasis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PriceBasis::Sku(filter) => write!(f, "{}", filter),
            PriceBasis::Generic => write!(f, "GENERIC"),
            PriceBasis::Unpriced => write!(f, "UNPRICED"),
        }
    }
}

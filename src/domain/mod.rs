// ==========================================
// 气瓶充装调度系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、固定枚举
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod cylinder;
pub mod import;
pub mod station;
pub mod transaction;
pub mod types;

// 重导出核心类型
pub use cylinder::{sku_prefix_of, Cylinder, CylinderDraft, DEFAULT_HOLDING_LOCATION};
pub use import::{ImportRow, ImportRowError, ImportSummary, RawImportLine};
pub use station::{RefillPriceRule, RefillStation};
pub use transaction::TransactionRecord;
pub use types::{CylinderSize, CylinderStatus, GasType, PriceBasis, TransactionKind};

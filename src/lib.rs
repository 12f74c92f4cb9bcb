// ==========================================
// 气瓶充装调度系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 核心: 充装站兼容性匹配 / 费用汇总 / 送充与回库流转 / 批量导入校验
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 业务规则（纯计算,不做 I/O）
pub mod engine;

// 导入层 - 外部数据
pub mod importer;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// 应用层 - 组装
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{CylinderSize, CylinderStatus, GasType, PriceBasis, TransactionKind};

// 领域实体
pub use domain::{Cylinder, ImportRow, RefillPriceRule, RefillStation, TransactionRecord};

// 引擎
pub use engine::{
    BatchOutcome, CompatibilityMatcher, CostAggregator, CostSummary, DispatchWorkflow,
    MatchResult, RentalWorkflow, RestockWorkflow,
};

// API
pub use api::{ApiError, ApiResult, BatchAck, CylinderApi, ImportApi, RefillApi, StationApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "气瓶充装调度系统";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}

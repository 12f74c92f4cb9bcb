// ==========================================
// 气瓶充装调度系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod cylinder_repo;
pub mod error;
pub mod price_rule_repo;
mod row_codec;
pub mod station_repo;
pub mod transaction_repo;

// 重导出核心仓储
pub use cylinder_repo::{CylinderQuery, CylinderRepository, Page};
pub use error::{RepositoryError, RepositoryResult};
pub use price_rule_repo::PriceRuleRepository;
pub use station_repo::StationRepository;
pub use transaction_repo::TransactionRepository;

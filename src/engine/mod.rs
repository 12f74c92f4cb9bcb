// ==========================================
// 气瓶充装调度系统 - 引擎层
// ==========================================
// 职责: 匹配、计费、状态流转（同步、纯计算）
// 红线: Engine 不拼 SQL、不做 I/O;所有拒收必须输出 reason
// ==========================================

pub mod cost;
pub mod dispatch;
pub mod error;
pub mod matcher;
pub mod outcome;
pub mod rental;
pub mod restock;
pub mod rule_core;
mod transition;

// 重导出核心引擎
pub use cost::{CostAggregator, CostLine, CostSummary, RestockLine};
pub use dispatch::DispatchWorkflow;
pub use error::{EngineError, EngineResult};
pub use matcher::{CompatibilityMatcher, MatchRejection, MatchResult, RejectReason};
pub use outcome::{BatchCommit, BatchOutcome, NoOpReason};
pub use rental::RentalWorkflow;
pub use restock::{parse_cost, RestockWorkflow};
pub use rule_core::{PriceRuleBook, PriceRuleEntry, SkuPredicate};

// ==========================================
// 气瓶充装调度系统 - API 层
// ==========================================
// 职责: 提供业务 API 接口,组装仓储与引擎
// 红线: 写入接口返回提交后回读的数据
// ==========================================

pub mod ack;
pub mod cylinder_api;
pub mod error;
pub mod import_api;
pub mod refill_api;
pub mod station_api;

// 重导出核心类型
pub use ack::BatchAck;
pub use cylinder_api::CylinderApi;
pub use error::{ApiError, ApiResult};
pub use import_api::{ImportApi, ImportCommit, ImportPreview};
pub use refill_api::{DispatchPreview, RefillApi, RefillingOverview};
pub use station_api::{PriceRuleInput, StationApi, StationInput};

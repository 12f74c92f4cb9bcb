// ==========================================
// 气瓶充装调度系统 - 引擎层错误类型
// ==========================================
// 工具: thiserror 派生宏
// 说明: 仅覆盖调用方契约违反;前置条件不满足走 NoOp,不报错
// ==========================================

use crate::domain::types::CylinderStatus;
use thiserror::Error;

/// 引擎层错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("气瓶不在快照中: cylinder_id={0}")]
    UnknownCylinder(String),

    #[error("无效的状态转换: cylinder_id={cylinder_id}, from={from} to={to}")]
    InvalidStateTransition {
        cylinder_id: String,
        from: CylinderStatus,
        to: CylinderStatus,
    },
}

/// Result 类型别名
pub type EngineResult<T> = Result<T, EngineError>;

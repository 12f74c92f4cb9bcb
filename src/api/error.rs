// ==========================================
// 气瓶充装调度系统 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型,将仓储/引擎/导入错误转换为面向操作员的错误消息
// 说明: 前置条件不满足（空选择 / 未选站点）不是错误,见 BatchAck::NoOp
// ==========================================

use crate::engine::EngineError;
use crate::importer::ImportError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 业务规则错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    #[error("业务规则违反: {0}")]
    BusinessRuleViolation(String),

    /// 调用方契约违反: 批次内存在状态不符的气瓶（整批未执行）
    #[error("无效的状态转换: cylinder={cylinder_id}, from={from} to={to}")]
    InvalidStateTransition {
        cylinder_id: String,
        from: String,
        to: String,
    },

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    #[error("数据库事务失败: {0}")]
    DatabaseTransactionError(String),

    // ==========================================
    // 导入 / 配置错误
    // ==========================================
    #[error("文件导入失败: {0}")]
    ImportError(String),

    #[error("配置读取失败: {0}")]
    ConfigError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseConnectionError(format!("数据库锁获取失败: {}", msg))
            }
            RepositoryError::DatabaseTransactionError(msg) => {
                ApiError::DatabaseTransactionError(msg)
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::UniqueConstraintViolation(msg) => {
                ApiError::BusinessRuleViolation(format!("唯一约束违反: {}", msg))
            }
            RepositoryError::ForeignKeyViolation(msg) => {
                ApiError::BusinessRuleViolation(format!("外键约束违反: {}", msg))
            }
            RepositoryError::StateConflict {
                entity,
                id,
                expected,
                actual,
            } => ApiError::BusinessRuleViolation(format!(
                "{}(id={})状态已被其他操作改变: 期望 {}, 实际 {}",
                entity, id, expected, actual
            )),
            RepositoryError::FieldValueError { field, message } => {
                ApiError::InvalidInput(format!("字段{}错误: {}", field, message))
            }
            RepositoryError::SerializationError(msg) => ApiError::InternalError(msg),
            RepositoryError::Other(err) => ApiError::Other(err),
        }
    }
}

// ==========================================
// 从 EngineError 转换
// ==========================================
impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::UnknownCylinder(id) => {
                ApiError::NotFound(format!("Cylinder(id={})不存在", id))
            }
            EngineError::InvalidStateTransition {
                cylinder_id,
                from,
                to,
            } => ApiError::InvalidStateTransition {
                cylinder_id,
                from: from.to_string(),
                to: to.to_string(),
            },
        }
    }
}

// ==========================================
// 从 ImportError 转换
// ==========================================
impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::Other(err) => ApiError::Other(err),
            other => ApiError::ImportError(other.to_string()),
        }
    }
}

/// 配置读取错误转换（ConfigManager 返回 Box<dyn Error>）
pub(crate) fn config_error(err: Box<dyn std::error::Error>) -> ApiError {
    ApiError::ConfigError(err.to_string())
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::CylinderStatus;

    #[test]
    fn test_repository_not_found_message() {
        let err: ApiError = RepositoryError::not_found("RefillStation", "s9").into();
        assert_eq!(err.to_string(), "资源未找到: RefillStation(id=s9)不存在");
    }

    #[test]
    fn test_engine_transition_error_keeps_cylinder() {
        let err: ApiError = EngineError::InvalidStateTransition {
            cylinder_id: "c1".to_string(),
            from: CylinderStatus::Available,
            to: CylinderStatus::Refilling,
        }
        .into();
        match err {
            ApiError::InvalidStateTransition { cylinder_id, from, to } => {
                assert_eq!(cylinder_id, "c1");
                assert_eq!(from, "AVAILABLE");
                assert_eq!(to, "REFILLING");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_state_conflict_is_business_rule_violation() {
        let err: ApiError = RepositoryError::StateConflict {
            entity: "Cylinder".to_string(),
            id: "c1".to_string(),
            expected: "EMPTY_REFILL".to_string(),
            actual: "REFILLING".to_string(),
        }
        .into();
        match err {
            ApiError::BusinessRuleViolation(msg) => {
                assert!(msg.contains("c1"));
                assert!(msg.contains("REFILLING"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_import_error_is_wrapped() {
        let err: ApiError = ImportError::UnsupportedFormat("pdf".to_string()).into();
        assert!(matches!(err, ApiError::ImportError(_)));
    }
}

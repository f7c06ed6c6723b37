// ==========================================
// 员工主数据生命周期系统 - API层错误类型
// ==========================================
// 职责: 将仓储/引擎层技术错误转换为用户可读的业务错误
// 口径: NOT_FOUND 与 VALIDATION 必须可区分（调用方映射 404/400）
// ==========================================

use crate::engine::TaskGenerationError;
use crate::importer::ImportError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ===== 业务规则错误 =====
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    #[error("业务规则违反: {0}")]
    BusinessRuleViolation(String),

    // ===== 数据访问错误 =====
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    #[error("数据库事务失败: {0}")]
    DatabaseTransactionError(String),

    // ===== 导入错误 =====
    #[error("文件导入失败: {0}")]
    ImportError(String),

    #[error("数据验证失败: {0}")]
    ValidationError(String),

    // ===== 通用错误 =====
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
            RepositoryError::DatabaseConnectionError(msg) => ApiError::DatabaseConnectionError(msg),
            RepositoryError::DatabaseTransactionError(msg) => {
                ApiError::DatabaseTransactionError(msg)
            }
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseConnectionError(format!("数据库锁获取失败: {}", msg))
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::UniqueConstraintViolation(msg) => {
                ApiError::BusinessRuleViolation(format!("唯一约束违反: {}", msg))
            }
            RepositoryError::ForeignKeyViolation(msg) => {
                ApiError::BusinessRuleViolation(format!("外键约束违反: {}", msg))
            }
            RepositoryError::ValidationError(msg) => ApiError::ValidationError(msg),
            RepositoryError::FieldValueError { field, message } => {
                ApiError::InvalidInput(format!("字段{}错误: {}", field, message))
            }
            RepositoryError::InternalError(msg) => ApiError::InternalError(msg),
            RepositoryError::Other(err) => ApiError::Other(err),
        }
    }
}

// ==========================================
// 从 ImportError 转换
// 口径: 上传限制类错误对外是验证错误，其余是导入失败
// ==========================================
impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        if err.is_validation() {
            ApiError::ValidationError(err.to_string())
        } else {
            ApiError::ImportError(err.to_string())
        }
    }
}

// ==========================================
// 从 TaskGenerationError 转换
// ==========================================
impl From<TaskGenerationError> for ApiError {
    fn from(err: TaskGenerationError) -> Self {
        match err {
            TaskGenerationError::EmployeeNotFound(id) => {
                ApiError::NotFound(format!("员工(id={})不存在", id))
            }
            TaskGenerationError::TemplateNotFound(id) => {
                ApiError::NotFound(format!("任务模板(id={})不存在", id))
            }
            TaskGenerationError::Validation(msg) => ApiError::ValidationError(msg),
            TaskGenerationError::Repository(repo_err) => repo_err.into(),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

/// 将动态错误装箱为内部错误（配置层/引擎层 Box<dyn Error> 专用）
pub fn internal(err: Box<dyn std::error::Error>) -> ApiError {
    ApiError::InternalError(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_error_conversion() {
        let repo_err = RepositoryError::NotFound {
            entity: "Employee".to_string(),
            id: "E001".to_string(),
        };
        let api_err: ApiError = repo_err.into();
        match api_err {
            ApiError::NotFound(msg) => {
                assert!(msg.contains("Employee"));
                assert!(msg.contains("E001"));
            }
            _ => panic!("Expected NotFound"),
        }
    }

    #[test]
    fn test_import_error_split() {
        let err: ApiError = ImportError::TooManyRows {
            actual_rows: 6000,
            max_rows: 5000,
        }
        .into();
        assert!(matches!(err, ApiError::ValidationError(_)));

        let err: ApiError = ImportError::ExcelParseError("bad".to_string()).into();
        assert!(matches!(err, ApiError::ImportError(_)));
    }

    #[test]
    fn test_generation_error_taxonomy() {
        let err: ApiError = TaskGenerationError::EmployeeNotFound("E001".to_string()).into();
        assert!(matches!(err, ApiError::NotFound(_)));

        let err: ApiError = TaskGenerationError::Validation("锚点缺失".to_string()).into();
        assert!(matches!(err, ApiError::ValidationError(_)));
    }
}

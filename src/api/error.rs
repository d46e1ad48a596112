// ==========================================
// 供应链经营管理系统 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型，转换仓储/引擎错误为用户友好的错误消息
// 红线: 状态机前置条件违反必须原样呈现给调用方，不得掩盖或重试
// ==========================================

use crate::engine::allocator::AllocatorError;
use crate::importer::error::ImportError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
/// 所有错误信息必须包含显式原因
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 状态机前置条件违反（原样上抛）
    // ==========================================
    #[error("条目已被分配: {0}")]
    AlreadyAssigned(String),

    #[error("条目未处于已分配状态: {0}")]
    NotAssigned(String),

    #[error("条目已归档: {0}")]
    EntryArchived(String),

    // ==========================================
    // 业务规则错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    #[error("码值已存在: {0}")]
    AlreadyExists(String),

    #[error("数据验证失败: {0}")]
    ValidationError(String),

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    // ==========================================
    // 导入错误
    // ==========================================
    #[error("文件导入失败: {0}")]
    ImportError(String),

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
// 目的: 将仓储层的技术错误转换为用户友好的业务错误
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::AlreadyExists { code } => ApiError::AlreadyExists(code),
            RepositoryError::InvalidTypeValue { value } => {
                ApiError::ValidationError(format!("类型值不合法: {}", value))
            }
            RepositoryError::StatusConflict { id, expected, actual } => {
                ApiError::ValidationError(format!(
                    "状态条件更新冲突: id={}，期望 {}，实际 {}",
                    id, expected, actual
                ))
            }
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            RepositoryError::DatabaseConnectionError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseError(format!("数据库锁获取失败: {}", msg))
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::ValidationError(msg) => ApiError::ValidationError(msg),
            RepositoryError::InternalError(msg) => ApiError::InternalError(msg),
            RepositoryError::Other(err) => ApiError::Other(err),
        }
    }
}

// ==========================================
// 从 AllocatorError 转换（前置条件违反逐一保真）
// ==========================================
impl From<AllocatorError> for ApiError {
    fn from(err: AllocatorError) -> Self {
        match err {
            AllocatorError::AlreadyAssigned { id } => ApiError::AlreadyAssigned(id),
            AllocatorError::NotAssigned { id } => ApiError::NotAssigned(id),
            AllocatorError::EntryArchived { id } => ApiError::EntryArchived(id),
            AllocatorError::NotFound { id } => {
                ApiError::NotFound(format!("PoolEntry(id={})不存在", id))
            }
            AllocatorError::Store(e) => e.into(),
        }
    }
}

// ==========================================
// 从 ImportError 转换
// ==========================================
impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        ApiError::ImportError(err.to_string())
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

// ==========================================
// 供应链经营管理系统 - 仓储层错误类型
// ==========================================
// 依据: Rust 错误处理最佳实践
// 工具: thiserror 派生宏
// 说明: 约束违反按类别区分（唯一约束 ≠ 检查约束），
//       上层分支逻辑不依赖具体存储引擎的错误码
// ==========================================

use crate::domain::types::PoolStatus;
use thiserror::Error;

/// 仓储层错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    // ===== 约束类错误 =====
    #[error("码值已存在: {code}")]
    AlreadyExists { code: String },

    #[error("类型值约束违反: {value}")]
    InvalidTypeValue { value: String },

    // ===== 并发控制错误 =====
    #[error("状态条件更新冲突: id={id}, expected={expected}, actual={actual}")]
    StatusConflict {
        id: String,
        expected: PoolStatus,
        actual: PoolStatus,
    },

    // ===== 数据库错误 =====
    #[error("记录未找到: {entity} with id={id}")]
    NotFound { entity: String, id: String },

    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    #[error("数据库锁获取失败: {0}")]
    LockError(String),

    #[error("数据库查询失败: {0}")]
    DatabaseQueryError(String),

    // ===== 数据质量错误 =====
    #[error("数据验证失败: {0}")]
    ValidationError(String),

    // ===== 通用错误 =====
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RepositoryError {
    /// 从 rusqlite 错误分类转换
    ///
    /// 说明：
    /// - UNIQUE 违反需携带码值上下文，由调用方传入
    /// - CHECK 违反归类为类型值约束（本 schema 中仅 type/status 有 CHECK）
    pub fn from_sqlite(err: rusqlite::Error, code: &str, type_value: &str) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(_, Some(msg)) => {
                if msg.contains("UNIQUE") {
                    RepositoryError::AlreadyExists {
                        code: code.to_string(),
                    }
                } else if msg.contains("CHECK") {
                    RepositoryError::InvalidTypeValue {
                        value: type_value.to_string(),
                    }
                } else {
                    RepositoryError::DatabaseQueryError(msg)
                }
            }
            rusqlite::Error::QueryReturnedNoRows => RepositoryError::NotFound {
                entity: "Unknown".to_string(),
                id: "Unknown".to_string(),
            },
            _ => RepositoryError::DatabaseQueryError(err.to_string()),
        }
    }
}

// 无约束上下文时的兜底转换
impl From<rusqlite::Error> for RepositoryError {
    fn from(err: rusqlite::Error) -> Self {
        RepositoryError::from_sqlite(err, "", "")
    }
}

/// Result 类型别名
pub type RepositoryResult<T> = Result<T, RepositoryError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn sqlite_failure(msg: &str) -> rusqlite::Error {
        rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_CONSTRAINT),
            Some(msg.to_string()),
        )
    }

    #[test]
    fn test_unique_violation_maps_to_already_exists() {
        let err = RepositoryError::from_sqlite(
            sqlite_failure("UNIQUE constraint failed: gtin_pool.code"),
            "8437012345678",
            "EAN",
        );
        match err {
            RepositoryError::AlreadyExists { code } => assert_eq!(code, "8437012345678"),
            other => panic!("期望 AlreadyExists，得到 {:?}", other),
        }
    }

    #[test]
    fn test_check_violation_maps_to_invalid_type_value() {
        let err = RepositoryError::from_sqlite(
            sqlite_failure("CHECK constraint failed: gtin_pool"),
            "8437012345678",
            "ISBN",
        );
        match err {
            RepositoryError::InvalidTypeValue { value } => assert_eq!(value, "ISBN"),
            other => panic!("期望 InvalidTypeValue，得到 {:?}", other),
        }
    }

    #[test]
    fn test_other_failure_maps_to_query_error() {
        let err = RepositoryError::from_sqlite(sqlite_failure("disk I/O error"), "", "");
        assert!(matches!(err, RepositoryError::DatabaseQueryError(_)));
    }
}

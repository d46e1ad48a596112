// ==========================================
// 供应链经营管理系统 - 数据仓储层
// ==========================================
// 红线: 唯一事实层，状态迁移一律条件更新，写入带操作人审计
// ==========================================

// 模块声明
pub mod error;
pub mod identifier_repo;
pub mod pool_store;

// 重导出核心类型
pub use error::{RepositoryError, RepositoryResult};
pub use identifier_repo::IdentifierRepository;
pub use pool_store::{PoolStore, SqlitePoolStore};

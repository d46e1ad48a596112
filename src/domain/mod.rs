// ==========================================
// 供应链经营管理系统 - 领域层
// ==========================================
// 职责: 实体定义与封闭类型枚举
// ==========================================

// 模块声明
pub mod identifier;
pub mod pool;
pub mod types;

// 重导出核心类型
pub use identifier::{IdentifierBinding, IdentifierRecord};
pub use pool::{
    CommitOutcome, ImportPreview, ImportPreviewRow, NewPoolEntry, OwnerPatch, PoolEntry,
    PoolSummary, TypeErrorDetail,
};
pub use types::{GtinType, PoolStatus};

// ==========================================
// 供应链经营管理系统 - 引擎层
// ==========================================
// 职责: 业务规则（码值校验/类型归一/分配状态机）
// ==========================================

// 模块声明
pub mod allocator;
pub mod code_validator;
pub mod type_normalizer;

// 重导出核心类型
pub use allocator::{AllocatorError, AllocatorResult, PoolAllocator};
pub use code_validator::{strip_non_digits, validate_code, CodeCheck};
pub use type_normalizer::normalize_type_label;

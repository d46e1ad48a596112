// ==========================================
// 供应链经营管理系统 - API 层
// ==========================================
// 职责: 面向调用方的业务接口（池管理面 + 项目标识绑定面）
// ==========================================

// 模块声明
pub mod error;
pub mod identifier_api;
pub mod pool_api;

// 重导出核心类型
pub use error::{ApiError, ApiResult};
pub use identifier_api::{IdentifierApi, ManualIdentifierInput};
pub use pool_api::PoolApi;

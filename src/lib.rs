// ==========================================
// 供应链经营管理系统 - GTIN 条码池核心库
// ==========================================
// 职责: 条码资源池生命周期 + 批量导入管线 + 项目标识绑定
// 技术栈: Rust + SQLite
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 业务规则
pub mod engine;

// 导入层 - 外部数据
pub mod importer;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// 应用层 - 组装
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{GtinType, PoolStatus};

// 领域实体
pub use domain::{
    CommitOutcome, IdentifierBinding, IdentifierRecord, ImportPreview, ImportPreviewRow,
    NewPoolEntry, PoolEntry, PoolSummary, TypeErrorDetail,
};

// 引擎
pub use engine::{
    allocator::{AllocatorError, PoolAllocator},
    code_validator::{validate_code, CodeCheck},
    type_normalizer::normalize_type_label,
};

// 导入管线
pub use importer::{BatchParser, ImportLayout, ImportPipeline};

// 仓储
pub use repository::{IdentifierRepository, PoolStore, SqlitePoolStore};

// API
pub use api::{IdentifierApi, PoolApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 子系统名称
pub const APP_NAME: &str = "GTIN 条码池子系统";

// 数据库版本
pub const DB_VERSION: &str = "v0.1";

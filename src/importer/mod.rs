// ==========================================
// 供应链经营管理系统 - 导入层
// ==========================================
// 职责: 上传载荷 → 预览 → 确认落库
// 支持: UTF-8 逗号分隔文本（两种布局，自动探测）
// ==========================================

// 模块声明
pub mod batch_parser;
pub mod error;
pub mod pipeline;

// 重导出核心类型
pub use batch_parser::{BatchParser, ImportLayout, ParsedBatch, RawCodeRecord};
pub use error::{ImportError, ImportResult};
pub use pipeline::ImportPipeline;

// ==========================================
// 供应链经营管理系统 - 导入模块错误类型
// ==========================================
// 依据: Rust 错误处理最佳实践
// 工具: thiserror 派生宏
// 说明: 单行的数据问题不在此层表达——逐行结果记入预览/落库结果，
//       这里只覆盖整个载荷层面的失败
// ==========================================

use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 载荷相关错误 =====
    #[error("载荷为空，没有可解析的行")]
    EmptyPayload,

    #[error("CSV 解析失败: {0}")]
    CsvParseError(String),

    #[error("文件读取失败: {0}")]
    FileReadError(String),

    // ===== 数据库错误 =====
    #[error("数据库查询失败: {0}")]
    DatabaseQueryError(String),

    // ===== 通用错误 =====
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

// 实现 From<csv::Error>
impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParseError(err.to_string())
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;

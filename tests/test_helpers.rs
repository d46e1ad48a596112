// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 提供测试所需的数据库初始化、测试数据生成等功能
// ==========================================

use gtin_pool::db;
use gtin_pool::domain::NewPoolEntry;
use gtin_pool::domain::types::GtinType;
use rusqlite::Connection;
use std::error::Error;
use tempfile::NamedTempFile;

/// 创建临时测试数据库并初始化 schema
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file.path().to_str().unwrap().to_string();

    let conn = db::open_sqlite_connection(&db_path)?;
    db::init_schema(&conn)?;

    Ok((temp_file, db_path))
}

/// 打开测试数据库连接
#[allow(dead_code)]
pub fn open_test_connection(db_path: &str) -> Result<Connection, Box<dyn Error>> {
    Ok(db::open_sqlite_connection(db_path)?)
}

/// 构造一条 EAN-13 入池数据
#[allow(dead_code)]
pub fn new_ean_entry(code: &str) -> NewPoolEntry {
    NewPoolEntry {
        code: Some(code.to_string()),
        gtin_type: GtinType::Ean,
        notes: None,
    }
}

/// 构造一条 UPC-12 入池数据
#[allow(dead_code)]
pub fn new_upc_entry(code: &str) -> NewPoolEntry {
    NewPoolEntry {
        code: Some(code.to_string()),
        gtin_type: GtinType::Upc,
        notes: None,
    }
}

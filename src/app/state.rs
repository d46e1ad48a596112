// ==========================================
// 供应链经营管理系统 - 应用状态组装
// ==========================================
// 职责: 打开数据库、初始化 schema、组装仓储与 API
// 说明: 各仓储共享同一连接，避免文件库上的并发 busy
// ==========================================

use crate::api::{IdentifierApi, PoolApi};
use crate::db::{self, open_sqlite_connection};
use crate::repository::{IdentifierRepository, RepositoryError, RepositoryResult, SqlitePoolStore};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

/// 应用状态
///
/// 持有池管理面与项目标识绑定面两个 API 入口。
pub struct AppState {
    pub pool_api: PoolApi<SqlitePoolStore>,
    pub identifier_api: IdentifierApi<SqlitePoolStore>,
    pub db_path: String,
}

impl AppState {
    /// 初始化应用状态
    ///
    /// # 参数
    /// - db_path: 数据库文件路径（不存在则创建并建表）
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        db::init_schema(&conn)?;

        // schema 版本仅提示告警，不做自动迁移
        match db::read_schema_version(&conn)? {
            Some(v) if v != db::CURRENT_SCHEMA_VERSION => {
                warn!(
                    found = v,
                    expected = db::CURRENT_SCHEMA_VERSION,
                    "schema_version 与当前代码不一致，请确认迁移状态"
                );
            }
            None => {
                return Err(RepositoryError::InternalError(
                    "schema_version 表缺失，数据库初始化失败".to_string(),
                ));
            }
            _ => {}
        }

        let conn = Arc::new(Mutex::new(conn));
        let store = Arc::new(SqlitePoolStore::from_connection(conn.clone()));
        let identifier_repo = Arc::new(IdentifierRepository::from_connection(conn));

        info!(db_path = %db_path, "AppState 初始化完成");

        Ok(Self {
            pool_api: PoolApi::new(store.clone()),
            identifier_api: IdentifierApi::new(store, identifier_repo),
            db_path: db_path.to_string(),
        })
    }
}

/// 默认数据库路径（数据目录下，目录不存在则创建）
pub fn get_default_db_path() -> String {
    let base: PathBuf = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
    let dir = base.join("scm-dashboard");
    if let Err(e) = std::fs::create_dir_all(&dir) {
        warn!(error = %e, "创建数据目录失败，回退到当前目录");
        return "gtin_pool.db".to_string();
    }
    dir.join("gtin_pool.db").display().to_string()
}

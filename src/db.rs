// ==========================================
// 供应链经营管理系统 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为，避免"部分模块外键开启/部分不开启"
// - 统一 busy_timeout，减少并发写入时的偶发 busy 错误
// - 提供条码池 schema 的建表入口（含 code 唯一约束与 type 检查约束）
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前代码所期望的 schema_version
///
/// 说明：
/// - 版本号用于提示/告警（不做自动迁移），避免静默在旧库上运行导致隐性错误。
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要"每个连接"单独开启
/// - busy_timeout 需要"每个连接"单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 初始化条码池 schema（幂等）
///
/// 约束要点：
/// - gtin_pool.code 唯一约束由数据库执行，导入前的预检查只是提示，
///   并发导入下的最终裁决在这里（UNIQUE → AlreadyExists）
/// - gtin_pool.type / status 使用 CHECK 约束而非外键表，
///   约束违反以独立错误类别上抛（CHECK → InvalidTypeValue）
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS gtin_pool (
            id          TEXT PRIMARY KEY,
            code        TEXT UNIQUE,
            type        TEXT NOT NULL CHECK (type IN ('EAN', 'UPC', 'GTIN_EXEMPT')),
            status      TEXT NOT NULL DEFAULT 'AVAILABLE'
                        CHECK (status IN ('AVAILABLE', 'ASSIGNED', 'ARCHIVED')),
            owner_ref   TEXT,
            assigned_at TEXT,
            notes       TEXT,
            created_at  TEXT NOT NULL,
            created_by  TEXT NOT NULL,
            updated_at  TEXT NOT NULL,
            updated_by  TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_gtin_pool_status ON gtin_pool(status);
        CREATE INDEX IF NOT EXISTS idx_gtin_pool_owner ON gtin_pool(owner_ref);

        CREATE TABLE IF NOT EXISTS project_identifier (
            project_ref      TEXT PRIMARY KEY,
            gtin_type        TEXT CHECK (gtin_type IN ('EAN', 'UPC', 'GTIN_EXEMPT')),
            gtin_code        TEXT,
            exemption_reason TEXT,
            asin             TEXT,
            fnsku            TEXT,
            source_entry_id  TEXT,
            created_at       TEXT NOT NULL,
            updated_at       TEXT NOT NULL,
            updated_by       TEXT NOT NULL
        );

        INSERT OR IGNORE INTO schema_version (version) VALUES (1);
        "#,
    )?;
    Ok(())
}

/// 读取 schema_version（若表不存在则返回 None）
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> =
        conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_schema_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        init_schema(&conn).unwrap();

        assert_eq!(read_schema_version(&conn).unwrap(), Some(1));
    }

    #[test]
    fn test_schema_version_absent() {
        let conn = Connection::open_in_memory().unwrap();
        assert_eq!(read_schema_version(&conn).unwrap(), None);
    }
}

// ==========================================
// 供应链经营管理系统 - 条码池仓储
// ==========================================
// 职责: gtin_pool 表的读写，状态迁移一律条件更新
// 红线: 码值唯一性由数据库约束裁决，预检查只是提示；
//       Assign 竞争下恰有一方成功，禁止先读后写
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::pool::{NewPoolEntry, OwnerPatch, PoolEntry, PoolSummary};
use crate::domain::types::{GtinType, PoolStatus};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::Utc;
use rusqlite::{params, Connection, Result as SqliteResult, ToSql};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

// ==========================================
// PoolStore - 池仓储契约
// ==========================================
/// 条码池存储协作方契约
///
/// 调用方（分配引擎/导入管线）只通过这组操作触碰池条目。
/// actor 为显式操作人标识，写入审计列，不读取任何进程级会话。
#[async_trait::async_trait]
pub trait PoolStore: Send + Sync {
    /// 列出条目（可按状态过滤）
    async fn list_entries(&self, status: Option<PoolStatus>) -> RepositoryResult<Vec<PoolEntry>>;

    /// 按ID查询
    async fn find_by_id(&self, id: &str) -> RepositoryResult<Option<PoolEntry>>;

    /// 按码值查询（绑定状态派生用）
    async fn find_by_code(&self, code: &str) -> RepositoryResult<Option<PoolEntry>>;

    /// 返回给定码值中已存在于池内的子集（任意状态）
    async fn filter_existing_codes(&self, codes: &[String]) -> RepositoryResult<Vec<String>>;

    /// 插入新条目（status = AVAILABLE）
    ///
    /// 唯一约束违反返回 AlreadyExists，类型检查约束违反返回 InvalidTypeValue。
    async fn insert_entry(&self, entry: NewPoolEntry, actor: &str) -> RepositoryResult<PoolEntry>;

    /// 条件状态更新（compare-and-swap 语义）
    ///
    /// 仅当当前 status = expected 时迁移到 new_status 并写入 owner 补丁；
    /// 条件不满足返回 StatusConflict（携带实际状态），条目不存在返回 NotFound。
    async fn update_entry_status(
        &self,
        id: &str,
        expected: PoolStatus,
        new_status: PoolStatus,
        owner: OwnerPatch,
        actor: &str,
    ) -> RepositoryResult<PoolEntry>;

    /// 归档条目（幂等：已归档时直接返回现状）
    async fn archive_entry(&self, id: &str, actor: &str) -> RepositoryResult<PoolEntry>;

    /// 更新备注
    async fn update_notes(&self, id: &str, notes: Option<&str>, actor: &str)
        -> RepositoryResult<PoolEntry>;

    /// 按状态统计
    async fn summarize(&self) -> RepositoryResult<PoolSummary>;
}

// ==========================================
// SqlitePoolStore - SQLite 实现
// ==========================================
pub struct SqlitePoolStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqlitePoolStore {
    /// 创建仓储实例
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 辅助方法：将数据库行映射为 PoolEntry
    fn map_row_to_entry(row: &rusqlite::Row) -> SqliteResult<PoolEntry> {
        let type_str: String = row.get(2)?;
        let status_str: String = row.get(3)?;

        Ok(PoolEntry {
            id: row.get(0)?,
            code: row.get(1)?,
            // CHECK 约束保证合法值；解析失败按数据损坏兜底为豁免/归档之外的保守值
            gtin_type: GtinType::from_db_str(&type_str).unwrap_or(GtinType::Ean),
            status: PoolStatus::from_db_str(&status_str).unwrap_or(PoolStatus::Archived),
            owner_ref: row.get(4)?,
            assigned_at: row
                .get::<_, Option<String>>(5)?
                .and_then(|s| s.parse::<chrono::DateTime<chrono::Utc>>().ok()),
            notes: row.get(6)?,
            created_at: row
                .get::<_, String>(7)?
                .parse::<chrono::DateTime<chrono::Utc>>()
                .unwrap_or_else(|_| Utc::now()),
            created_by: row.get(8)?,
            updated_at: row
                .get::<_, String>(9)?
                .parse::<chrono::DateTime<chrono::Utc>>()
                .unwrap_or_else(|_| Utc::now()),
            updated_by: row.get(10)?,
        })
    }

    const SELECT_COLUMNS: &'static str = r#"
        id, code, type, status, owner_ref, assigned_at, notes,
        created_at, created_by, updated_at, updated_by
    "#;

    fn find_by_id_inner(conn: &Connection, id: &str) -> RepositoryResult<Option<PoolEntry>> {
        let sql = format!(
            "SELECT {} FROM gtin_pool WHERE id = ?1",
            Self::SELECT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let result = stmt.query_row(params![id], Self::map_row_to_entry);

        match result {
            Ok(entry) => Ok(Some(entry)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait::async_trait]
impl PoolStore for SqlitePoolStore {
    async fn list_entries(&self, status: Option<PoolStatus>) -> RepositoryResult<Vec<PoolEntry>> {
        let conn = self.get_conn()?;

        let entries = if let Some(status) = status {
            let sql = format!(
                "SELECT {} FROM gtin_pool WHERE status = ?1 ORDER BY created_at, id",
                Self::SELECT_COLUMNS
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(params![status.to_db_str()], Self::map_row_to_entry)?
                .collect::<SqliteResult<Vec<_>>>()?;
            rows
        } else {
            let sql = format!(
                "SELECT {} FROM gtin_pool ORDER BY created_at, id",
                Self::SELECT_COLUMNS
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([], Self::map_row_to_entry)?
                .collect::<SqliteResult<Vec<_>>>()?;
            rows
        };

        Ok(entries)
    }

    async fn find_by_id(&self, id: &str) -> RepositoryResult<Option<PoolEntry>> {
        let conn = self.get_conn()?;
        Self::find_by_id_inner(&conn, id)
    }

    async fn find_by_code(&self, code: &str) -> RepositoryResult<Option<PoolEntry>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM gtin_pool WHERE code = ?1",
            Self::SELECT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let result = stmt.query_row(params![code], Self::map_row_to_entry);

        match result {
            Ok(entry) => Ok(Some(entry)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn filter_existing_codes(&self, codes: &[String]) -> RepositoryResult<Vec<String>> {
        if codes.is_empty() {
            return Ok(vec![]);
        }

        // SQLite 默认变量上限通常为 999；留出余量，避免不同环境配置差异。
        const CHUNK_SIZE: usize = 900;

        let conn = self.get_conn()?;
        let mut existing = Vec::new();

        for chunk in codes.chunks(CHUNK_SIZE) {
            let placeholders = std::iter::repeat("?")
                .take(chunk.len())
                .collect::<Vec<_>>()
                .join(", ");
            let sql = format!(
                "SELECT code FROM gtin_pool WHERE code IN ({})",
                placeholders
            );

            let mut stmt = conn.prepare(&sql)?;
            let params_vec: Vec<&dyn ToSql> = chunk.iter().map(|s| s as &dyn ToSql).collect();
            let rows = stmt.query_map(params_vec.as_slice(), |row| row.get::<_, String>(0))?;
            existing.extend(rows.collect::<SqliteResult<Vec<_>>>()?);
        }

        Ok(existing)
    }

    async fn insert_entry(&self, entry: NewPoolEntry, actor: &str) -> RepositoryResult<PoolEntry> {
        // code 仅豁免类型允许为空
        if entry.code.is_none() && entry.gtin_type != GtinType::GtinExempt {
            return Err(RepositoryError::ValidationError(
                "非豁免类型的条目必须携带码值".to_string(),
            ));
        }

        let conn = self.get_conn()?;
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        let type_str = entry.gtin_type.to_db_str();

        conn.execute(
            r#"
            INSERT INTO gtin_pool (
                id, code, type, status, owner_ref, assigned_at, notes,
                created_at, created_by, updated_at, updated_by
            ) VALUES (?1, ?2, ?3, 'AVAILABLE', NULL, NULL, ?4, ?5, ?6, ?5, ?6)
            "#,
            params![id, entry.code, type_str, entry.notes, now, actor],
        )
        .map_err(|e| {
            RepositoryError::from_sqlite(e, entry.code.as_deref().unwrap_or(""), type_str)
        })?;

        Self::find_by_id_inner(&conn, &id)?.ok_or_else(|| RepositoryError::NotFound {
            entity: "PoolEntry".to_string(),
            id,
        })
    }

    async fn update_entry_status(
        &self,
        id: &str,
        expected: PoolStatus,
        new_status: PoolStatus,
        owner: OwnerPatch,
        actor: &str,
    ) -> RepositoryResult<PoolEntry> {
        let conn = self.get_conn()?;
        let now = Utc::now().to_rfc3339();

        // 条件更新：WHERE 同时比较 id 与当前状态，竞争由数据库裁决
        let changed = conn.execute(
            r#"
            UPDATE gtin_pool
            SET status = ?3,
                owner_ref = ?4,
                assigned_at = ?5,
                updated_at = ?6,
                updated_by = ?7
            WHERE id = ?1 AND status = ?2
            "#,
            params![
                id,
                expected.to_db_str(),
                new_status.to_db_str(),
                owner.owner_ref,
                owner.assigned_at.map(|t| t.to_rfc3339()),
                now,
                actor,
            ],
        )?;

        if changed == 0 {
            // 零行命中：区分"不存在"与"状态不符"
            return match Self::find_by_id_inner(&conn, id)? {
                None => Err(RepositoryError::NotFound {
                    entity: "PoolEntry".to_string(),
                    id: id.to_string(),
                }),
                Some(actual) => Err(RepositoryError::StatusConflict {
                    id: id.to_string(),
                    expected,
                    actual: actual.status,
                }),
            };
        }

        Self::find_by_id_inner(&conn, id)?.ok_or_else(|| RepositoryError::NotFound {
            entity: "PoolEntry".to_string(),
            id: id.to_string(),
        })
    }

    async fn archive_entry(&self, id: &str, actor: &str) -> RepositoryResult<PoolEntry> {
        let conn = self.get_conn()?;
        let now = Utc::now().to_rfc3339();

        // 归档清空持有者字段；已归档的条目不再改写（幂等）
        conn.execute(
            r#"
            UPDATE gtin_pool
            SET status = 'ARCHIVED',
                owner_ref = NULL,
                assigned_at = NULL,
                updated_at = ?2,
                updated_by = ?3
            WHERE id = ?1 AND status != 'ARCHIVED'
            "#,
            params![id, now, actor],
        )?;

        Self::find_by_id_inner(&conn, id)?.ok_or_else(|| RepositoryError::NotFound {
            entity: "PoolEntry".to_string(),
            id: id.to_string(),
        })
    }

    async fn update_notes(
        &self,
        id: &str,
        notes: Option<&str>,
        actor: &str,
    ) -> RepositoryResult<PoolEntry> {
        let conn = self.get_conn()?;
        let now = Utc::now().to_rfc3339();

        let changed = conn.execute(
            "UPDATE gtin_pool SET notes = ?2, updated_at = ?3, updated_by = ?4 WHERE id = ?1",
            params![id, notes, now, actor],
        )?;

        if changed == 0 {
            return Err(RepositoryError::NotFound {
                entity: "PoolEntry".to_string(),
                id: id.to_string(),
            });
        }

        Self::find_by_id_inner(&conn, id)?.ok_or_else(|| RepositoryError::NotFound {
            entity: "PoolEntry".to_string(),
            id: id.to_string(),
        })
    }

    async fn summarize(&self) -> RepositoryResult<PoolSummary> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare("SELECT status, COUNT(*) FROM gtin_pool GROUP BY status")?;

        let mut summary = PoolSummary {
            available: 0,
            assigned: 0,
            archived: 0,
            total: 0,
        };

        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?;

        for row in rows {
            let (status, count) = row?;
            match PoolStatus::from_db_str(&status) {
                Some(PoolStatus::Available) => summary.available = count,
                Some(PoolStatus::Assigned) => summary.assigned = count,
                Some(PoolStatus::Archived) => summary.archived = count,
                None => {}
            }
            summary.total += count;
        }

        Ok(summary)
    }
}

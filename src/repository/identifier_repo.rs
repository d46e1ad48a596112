// ==========================================
// 供应链经营管理系统 - 项目标识仓储
// ==========================================
// 职责: project_identifier 表的 upsert/查询（以 project_ref 为键）
// 说明: 池条目释放不会隐式删除本表记录（历史留痕），
//       清除只能由调用方显式发起
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::identifier::IdentifierRecord;
use crate::domain::types::GtinType;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::Utc;
use rusqlite::{params, Connection, Result as SqliteResult};
use std::sync::{Arc, Mutex};

// ==========================================
// IdentifierRepository - 项目标识仓储
// ==========================================
pub struct IdentifierRepository {
    conn: Arc<Mutex<Connection>>,
}

impl IdentifierRepository {
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

    /// 辅助方法：将数据库行映射为 IdentifierRecord
    fn map_row_to_record(row: &rusqlite::Row) -> SqliteResult<IdentifierRecord> {
        Ok(IdentifierRecord {
            project_ref: row.get(0)?,
            gtin_type: row
                .get::<_, Option<String>>(1)?
                .and_then(|s| GtinType::from_db_str(&s)),
            gtin_code: row.get(2)?,
            exemption_reason: row.get(3)?,
            asin: row.get(4)?,
            fnsku: row.get(5)?,
            source_entry_id: row.get(6)?,
            created_at: row
                .get::<_, String>(7)?
                .parse::<chrono::DateTime<chrono::Utc>>()
                .unwrap_or_else(|_| Utc::now()),
            updated_at: row
                .get::<_, String>(8)?
                .parse::<chrono::DateTime<chrono::Utc>>()
                .unwrap_or_else(|_| Utc::now()),
            updated_by: row.get(9)?,
        })
    }

    /// 按项目查询标识记录
    pub fn find_by_project(&self, project_ref: &str) -> RepositoryResult<Option<IdentifierRecord>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT
                project_ref, gtin_type, gtin_code, exemption_reason,
                asin, fnsku, source_entry_id,
                created_at, updated_at, updated_by
            FROM project_identifier
            WHERE project_ref = ?1
            "#,
        )?;

        let result = stmt.query_row(params![project_ref], Self::map_row_to_record);

        match result {
            Ok(record) => Ok(Some(record)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// upsert 标识记录（以 project_ref 为键）
    pub fn upsert(&self, record: &IdentifierRecord) -> RepositoryResult<()> {
        let project_ref = record.project_ref.trim();
        if project_ref.is_empty() {
            return Err(RepositoryError::ValidationError(
                "project_ref 不能为空".to_string(),
            ));
        }

        let conn = self.get_conn()?;
        let now = Utc::now().to_rfc3339();

        conn.execute(
            r#"
            INSERT INTO project_identifier (
                project_ref, gtin_type, gtin_code, exemption_reason,
                asin, fnsku, source_entry_id,
                created_at, updated_at, updated_by
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8, ?9)
            ON CONFLICT(project_ref) DO UPDATE SET
                gtin_type = excluded.gtin_type,
                gtin_code = excluded.gtin_code,
                exemption_reason = excluded.exemption_reason,
                asin = excluded.asin,
                fnsku = excluded.fnsku,
                source_entry_id = excluded.source_entry_id,
                updated_at = excluded.updated_at,
                updated_by = excluded.updated_by
            "#,
            params![
                project_ref,
                record.gtin_type.map(|t| t.to_db_str()),
                record.gtin_code,
                record.exemption_reason,
                record.asin,
                record.fnsku,
                record.source_entry_id,
                now,
                record.updated_by,
            ],
        )
        .map_err(|e| {
            RepositoryError::from_sqlite(
                e,
                record.gtin_code.as_deref().unwrap_or(""),
                record
                    .gtin_type
                    .map(|t| t.to_db_str())
                    .unwrap_or_default(),
            )
        })?;

        Ok(())
    }

    /// 显式清除项目的 GTIN 字段（保留 asin/fnsku 等平台标识）
    pub fn clear_gtin_fields(&self, project_ref: &str, actor: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let now = Utc::now().to_rfc3339();

        let changed = conn.execute(
            r#"
            UPDATE project_identifier
            SET gtin_type = NULL,
                gtin_code = NULL,
                exemption_reason = NULL,
                source_entry_id = NULL,
                updated_at = ?2,
                updated_by = ?3
            WHERE project_ref = ?1
            "#,
            params![project_ref, now, actor],
        )?;

        if changed == 0 {
            return Err(RepositoryError::NotFound {
                entity: "IdentifierRecord".to_string(),
                id: project_ref.to_string(),
            });
        }

        Ok(())
    }
}

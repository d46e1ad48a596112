// ==========================================
// 供应链经营管理系统 - 条码分配引擎
// ==========================================
// 职责: 池条目的分配/释放/归档状态机
// 红线: 至多一个持有者；Assign 竞争下恰有一方成功；
//       前置条件违反一律原样上抛，不重试不吞错
// ==========================================

use crate::domain::pool::{OwnerPatch, PoolEntry};
use crate::domain::types::PoolStatus;
use crate::repository::error::RepositoryError;
use crate::repository::pool_store::PoolStore;
use chrono::Utc;
use thiserror::Error;
use tracing::{info, warn};

/// 分配引擎错误类型
///
/// 前四种均为确定性的前置条件违反，由调用方直接呈现给用户。
#[derive(Error, Debug)]
pub enum AllocatorError {
    #[error("条目已被分配: id={id}")]
    AlreadyAssigned { id: String },

    #[error("条目未处于已分配状态: id={id}")]
    NotAssigned { id: String },

    #[error("条目已归档，不可再流转: id={id}")]
    EntryArchived { id: String },

    #[error("条目不存在: id={id}")]
    NotFound { id: String },

    #[error(transparent)]
    Store(#[from] RepositoryError),
}

pub type AllocatorResult<T> = Result<T, AllocatorError>;

// ==========================================
// PoolAllocator - 分配引擎
// ==========================================
/// 基于池仓储的状态迁移引擎
///
/// 状态机：
/// - AVAILABLE → ASSIGNED（Assign，条件更新保证竞争安全）
/// - ASSIGNED → AVAILABLE（Release，不触碰项目侧标识记录）
/// - AVAILABLE|ASSIGNED → ARCHIVED（Archive，幂等，终态）
pub struct PoolAllocator<S: PoolStore> {
    store: std::sync::Arc<S>,
}

impl<S: PoolStore> PoolAllocator<S> {
    pub fn new(store: std::sync::Arc<S>) -> Self {
        Self { store }
    }

    /// 分配条目给项目
    ///
    /// 前置条件: status = AVAILABLE。
    /// 失败语义: 已分配 → AlreadyAssigned，已归档 → EntryArchived，
    /// 不存在 → NotFound。两个并发 Assign 恰有一方成功。
    pub async fn assign(
        &self,
        entry_id: &str,
        project_ref: &str,
        actor: &str,
    ) -> AllocatorResult<PoolEntry> {
        let patch = OwnerPatch {
            owner_ref: Some(project_ref.to_string()),
            assigned_at: Some(Utc::now()),
        };

        let result = self
            .store
            .update_entry_status(
                entry_id,
                PoolStatus::Available,
                PoolStatus::Assigned,
                patch,
                actor,
            )
            .await;

        match result {
            Ok(entry) => {
                info!(
                    entry_id = %entry_id,
                    project_ref = %project_ref,
                    code = ?entry.code,
                    "条码分配成功"
                );
                Ok(entry)
            }
            Err(e) => {
                let mapped = Self::map_conflict(e, entry_id, PoolStatus::Available);
                warn!(entry_id = %entry_id, project_ref = %project_ref, error = %mapped, "条码分配失败");
                Err(mapped)
            }
        }
    }

    /// 释放条目回池
    ///
    /// 前置条件: status = ASSIGNED。清空持有者字段。
    /// 项目侧标识记录保留不动，需要清除时由调用方显式发起。
    pub async fn release(&self, entry_id: &str, actor: &str) -> AllocatorResult<PoolEntry> {
        let result = self
            .store
            .update_entry_status(
                entry_id,
                PoolStatus::Assigned,
                PoolStatus::Available,
                OwnerPatch::default(),
                actor,
            )
            .await;

        match result {
            Ok(entry) => {
                info!(entry_id = %entry_id, code = ?entry.code, "条码释放回池");
                Ok(entry)
            }
            Err(e) => {
                let mapped = Self::map_conflict(e, entry_id, PoolStatus::Assigned);
                warn!(entry_id = %entry_id, error = %mapped, "条码释放失败");
                Err(mapped)
            }
        }
    }

    /// 归档条目
    ///
    /// 对任意非归档状态可用；已归档时为幂等成功（非错误）。
    /// 归档后码值保留，不再参与分配。
    pub async fn archive(&self, entry_id: &str, actor: &str) -> AllocatorResult<PoolEntry> {
        let entry = self
            .store
            .archive_entry(entry_id, actor)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound { id, .. } => AllocatorError::NotFound { id },
                other => AllocatorError::Store(other),
            })?;

        info!(entry_id = %entry_id, code = ?entry.code, "条码条目已归档");
        Ok(entry)
    }

    /// 把仓储层的条件更新冲突映射为状态机错误
    ///
    /// expected 是本次操作要求的前置状态，据此区分
    /// AlreadyAssigned / NotAssigned / EntryArchived。
    fn map_conflict(err: RepositoryError, entry_id: &str, expected: PoolStatus) -> AllocatorError {
        match err {
            RepositoryError::NotFound { .. } => AllocatorError::NotFound {
                id: entry_id.to_string(),
            },
            RepositoryError::StatusConflict { actual, .. } => match actual {
                // EntryArchived 只属于 Assign；Release 的前置条件违反一律 NotAssigned
                PoolStatus::Archived if expected == PoolStatus::Available => {
                    AllocatorError::EntryArchived {
                        id: entry_id.to_string(),
                    }
                }
                PoolStatus::Assigned if expected == PoolStatus::Available => {
                    AllocatorError::AlreadyAssigned {
                        id: entry_id.to_string(),
                    }
                }
                PoolStatus::Available | PoolStatus::Archived
                    if expected == PoolStatus::Assigned =>
                {
                    AllocatorError::NotAssigned {
                        id: entry_id.to_string(),
                    }
                }
                // 其余组合不在状态机内，按仓储错误上抛
                _ => AllocatorError::Store(RepositoryError::StatusConflict {
                    id: entry_id.to_string(),
                    expected,
                    actual,
                }),
            },
            other => AllocatorError::Store(other),
        }
    }
}

// ==========================================
// 项目标识绑定API (Identifier Binder)
// ==========================================
// 职责: 项目视角的标识读写，保持与池条目分配状态的一致视图
// 说明: 分配/释放委托给分配引擎；释放后项目侧记录保留不动
//       （历史留痕是刻意行为，界面据 sourced_from_pool 收起释放入口）
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::domain::identifier::{IdentifierBinding, IdentifierRecord};
use crate::domain::pool::PoolEntry;
use crate::domain::types::{GtinType, PoolStatus};
use crate::engine::allocator::PoolAllocator;
use crate::engine::code_validator::{strip_non_digits, validate_code};
use crate::repository::identifier_repo::IdentifierRepository;
use crate::repository::pool_store::PoolStore;
use chrono::Utc;
use std::sync::Arc;
use tracing::info;

/// 手工保存的输入参数
#[derive(Debug, Clone)]
pub struct ManualIdentifierInput {
    pub gtin_type: GtinType,
    pub gtin_code: Option<String>,
    pub exemption_reason: Option<String>,
    pub asin: Option<String>,
    pub fnsku: Option<String>,
}

/// 项目标识绑定API
pub struct IdentifierApi<S: PoolStore> {
    store: Arc<S>,
    allocator: PoolAllocator<S>,
    identifier_repo: Arc<IdentifierRepository>,
}

impl<S: PoolStore> IdentifierApi<S> {
    /// 创建新的IdentifierApi实例
    pub fn new(store: Arc<S>, identifier_repo: Arc<IdentifierRepository>) -> Self {
        let allocator = PoolAllocator::new(store.clone());
        Self {
            store,
            allocator,
            identifier_repo,
        }
    }

    /// 加载项目的标识绑定状态
    ///
    /// sourced_from_pool 的裁定以池条目为准（弱引用只是查询辅助）：
    /// 记录中的码值对应一个当前 ASSIGNED 给本项目的池条目时才成立。
    pub async fn load_binding(&self, project_ref: &str) -> ApiResult<IdentifierBinding> {
        let record = self.identifier_repo.find_by_project(project_ref)?;

        let (sourced_from_pool, pool_entry_id) = match record
            .as_ref()
            .and_then(|r| r.gtin_code.as_deref())
        {
            Some(code) => match self.store.find_by_code(code).await? {
                Some(entry)
                    if entry.status == PoolStatus::Assigned
                        && entry.owner_ref.as_deref() == Some(project_ref) =>
                {
                    (true, Some(entry.id))
                }
                _ => (false, None),
            },
            None => (false, None),
        };

        Ok(IdentifierBinding {
            record,
            sourced_from_pool,
            pool_entry_id,
        })
    }

    /// 手工保存项目标识（不经池分配）
    ///
    /// 校验规则（违反则拒绝，不落库）：
    /// - GTIN_EXEMPT: 豁免理由必填非空，码值强制置空
    /// - 其他类型: 码值必填且语法合法，豁免理由必须为空
    pub async fn save_manual(
        &self,
        project_ref: &str,
        input: ManualIdentifierInput,
        actor: &str,
    ) -> ApiResult<IdentifierRecord> {
        let (gtin_code, exemption_reason) = match input.gtin_type {
            GtinType::GtinExempt => {
                let reason = input
                    .exemption_reason
                    .as_deref()
                    .map(str::trim)
                    .filter(|r| !r.is_empty())
                    .ok_or_else(|| {
                        ApiError::ValidationError(
                            "豁免类型必须填写非空的豁免理由".to_string(),
                        )
                    })?;
                // 豁免强制清空码值
                (None, Some(reason.to_string()))
            }
            _ => {
                let raw = input
                    .gtin_code
                    .as_deref()
                    .map(str::trim)
                    .filter(|c| !c.is_empty())
                    .ok_or_else(|| {
                        ApiError::ValidationError("非豁免类型必须填写码值".to_string())
                    })?;
                let check = validate_code(raw);
                if !check.valid {
                    return Err(ApiError::ValidationError(format!(
                        "码值语法非法（需 12 或 13 位数字）: {}",
                        raw
                    )));
                }
                (Some(strip_non_digits(raw)), None)
            }
        };

        let existing = self.identifier_repo.find_by_project(project_ref)?;
        let now = Utc::now();

        let record = IdentifierRecord {
            project_ref: project_ref.to_string(),
            gtin_type: Some(input.gtin_type),
            gtin_code,
            exemption_reason,
            asin: input.asin,
            fnsku: input.fnsku,
            // 人工录入的码值不是池分配的产物
            source_entry_id: None,
            created_at: existing.map(|r| r.created_at).unwrap_or(now),
            updated_at: now,
            updated_by: actor.to_string(),
        };

        self.identifier_repo.upsert(&record)?;
        info!(project_ref = %project_ref, gtin_type = %input.gtin_type, actor = %actor, "项目标识手工保存");
        Ok(record)
    }

    /// 从池分配条码给项目
    ///
    /// 委托分配引擎执行条件更新，成功后把条目的码值/类型
    /// 镜像进项目标识记录，并清空豁免理由。
    pub async fn assign_from_pool(
        &self,
        project_ref: &str,
        entry_id: &str,
        actor: &str,
    ) -> ApiResult<PoolEntry> {
        let entry = self.allocator.assign(entry_id, project_ref, actor).await?;

        let existing = self.identifier_repo.find_by_project(project_ref)?;
        let now = Utc::now();

        let record = IdentifierRecord {
            project_ref: project_ref.to_string(),
            gtin_type: Some(entry.gtin_type),
            gtin_code: entry.code.clone(),
            exemption_reason: None,
            asin: existing.as_ref().and_then(|r| r.asin.clone()),
            fnsku: existing.as_ref().and_then(|r| r.fnsku.clone()),
            source_entry_id: Some(entry.id.clone()),
            created_at: existing.map(|r| r.created_at).unwrap_or(now),
            updated_at: now,
            updated_by: actor.to_string(),
        };
        self.identifier_repo.upsert(&record)?;

        info!(
            project_ref = %project_ref,
            entry_id = %entry_id,
            code = ?entry.code,
            actor = %actor,
            "池条码已分配并镜像到项目标识"
        );
        Ok(entry)
    }

    /// 释放项目持有的池条码
    ///
    /// 仅改写池条目状态；项目标识记录保留现值（历史留痕），
    /// 需要清除时调用 clear_identifier。
    pub async fn release(&self, entry_id: &str, actor: &str) -> ApiResult<PoolEntry> {
        let entry = self.allocator.release(entry_id, actor).await?;
        info!(entry_id = %entry_id, actor = %actor, "池条码已释放，项目标识记录保留");
        Ok(entry)
    }

    /// 显式清除项目的 GTIN 字段（asin/fnsku 保留）
    pub async fn clear_identifier(&self, project_ref: &str, actor: &str) -> ApiResult<()> {
        self.identifier_repo.clear_gtin_fields(project_ref, actor)?;
        info!(project_ref = %project_ref, actor = %actor, "项目 GTIN 字段已清除");
        Ok(())
    }
}

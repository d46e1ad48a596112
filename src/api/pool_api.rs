// ==========================================
// 条码池管理API
// ==========================================
// 职责: 封装池条目查询/创建/归档与批量导入功能
// 说明: 分配/释放走 IdentifierApi（项目侧入口），
//       这里只承担池本身的管理面
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::domain::pool::{
    CommitOutcome, ImportPreview, NewPoolEntry, PoolEntry, PoolSummary,
};
use crate::domain::types::{GtinType, PoolStatus};
use crate::engine::code_validator::{strip_non_digits, validate_code};
use crate::importer::ImportPipeline;
use crate::repository::pool_store::PoolStore;
use std::sync::Arc;
use tracing::info;

/// 条码池管理API
pub struct PoolApi<S: PoolStore> {
    store: Arc<S>,
    pipeline: ImportPipeline<S>,
}

impl<S: PoolStore> PoolApi<S> {
    /// 创建新的PoolApi实例
    pub fn new(store: Arc<S>) -> Self {
        let pipeline = ImportPipeline::new(store.clone());
        Self { store, pipeline }
    }

    /// 列出池条目
    ///
    /// # 参数
    /// - status: 可选状态过滤
    pub async fn list_entries(&self, status: Option<PoolStatus>) -> ApiResult<Vec<PoolEntry>> {
        Ok(self.store.list_entries(status).await?)
    }

    /// 按状态统计池概览（看板卡片用）
    pub async fn pool_summary(&self) -> ApiResult<PoolSummary> {
        Ok(self.store.summarize().await?)
    }

    /// 单条创建池条目
    ///
    /// # 说明
    /// - 与批量导入走同一仓储写入口，唯一约束语义一致
    /// - 码值语法校验在此拦截，豁免类型不携带码值
    pub async fn create_entry(
        &self,
        code: Option<&str>,
        gtin_type: GtinType,
        notes: Option<&str>,
        actor: &str,
    ) -> ApiResult<PoolEntry> {
        let code = match gtin_type {
            GtinType::GtinExempt => {
                if code.map(|c| !c.trim().is_empty()).unwrap_or(false) {
                    return Err(ApiError::InvalidInput(
                        "豁免类型条目不携带码值".to_string(),
                    ));
                }
                None
            }
            _ => {
                let raw = code
                    .map(str::trim)
                    .filter(|c| !c.is_empty())
                    .ok_or_else(|| ApiError::InvalidInput("码值不能为空".to_string()))?;
                let check = validate_code(raw);
                if !check.valid {
                    return Err(ApiError::ValidationError(format!(
                        "码值语法非法（需 12 或 13 位数字）: {}",
                        raw
                    )));
                }
                Some(strip_non_digits(raw))
            }
        };

        let entry = self
            .store
            .insert_entry(
                NewPoolEntry {
                    code,
                    gtin_type,
                    notes: notes.map(str::to_string),
                },
                actor,
            )
            .await?;

        info!(entry_id = %entry.id, code = ?entry.code, actor = %actor, "池条目创建成功");
        Ok(entry)
    }

    /// 归档池条目（幂等）
    ///
    /// 归档后码值保留，不再参与分配；归档是终态。
    pub async fn archive_entry(&self, entry_id: &str, actor: &str) -> ApiResult<PoolEntry> {
        let entry = self.store.archive_entry(entry_id, actor).await?;
        info!(entry_id = %entry_id, actor = %actor, "池条目已归档");
        Ok(entry)
    }

    /// 更新条目备注
    pub async fn update_notes(
        &self,
        entry_id: &str,
        notes: Option<&str>,
        actor: &str,
    ) -> ApiResult<PoolEntry> {
        Ok(self.store.update_notes(entry_id, notes, actor).await?)
    }

    /// 生成导入预览（无写入）
    pub async fn preview_import(&self, payload: &str) -> ApiResult<ImportPreview> {
        Ok(self.pipeline.preview(payload).await?)
    }

    /// 确认导入落库
    ///
    /// 仅写入预览中 合法 且 非池冲突 的行；
    /// AlreadyExists 按良性计数，不视为失败。
    pub async fn commit_import(&self, payload: &str, actor: &str) -> ApiResult<CommitOutcome> {
        let outcome = self.pipeline.commit(payload, actor).await?;
        info!(
            actor = %actor,
            inserted = outcome.inserted.len(),
            already_existed = outcome.already_existed.len(),
            "导入落库完成"
        );
        Ok(outcome)
    }
}

// ==========================================
// 供应链经营管理系统 - 批量导入管线
// ==========================================
// 职责: 载荷 → 预览（校验/去重/冲突检测），确认后仅落库安全子集
// 流程: 解析 → 类型归一 → 语法校验 → 批内去重 → 池冲突检测 → 逐行落库
// 红线: 单行数据问题绝不中断整批；落库逐行提交，
//       已成功的行不因后续行失败而回滚
// ==========================================

use crate::domain::pool::{
    CommitOutcome, ImportPreview, ImportPreviewRow, NewPoolEntry, TypeErrorDetail,
};
use crate::domain::types::GtinType;
use crate::engine::code_validator::{strip_non_digits, validate_code};
use crate::engine::type_normalizer::normalize_type_label;
use crate::importer::batch_parser::BatchParser;
use crate::importer::error::{ImportError, ImportResult};
use crate::repository::error::RepositoryError;
use crate::repository::pool_store::PoolStore;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, warn};

// ==========================================
// ImportPipeline - 导入管线
// ==========================================
pub struct ImportPipeline<S: PoolStore> {
    store: Arc<S>,
    parser: BatchParser,
}

impl<S: PoolStore> ImportPipeline<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            parser: BatchParser,
        }
    }

    /// 生成导入预览（无任何写入）
    ///
    /// 四个计数为同一行集上的独立分类（合法/非法/批内重复/池冲突），
    /// 不要求加总等于行数。
    pub async fn preview(&self, payload: &str) -> ImportResult<ImportPreview> {
        // === 步骤 1: 解析载荷 ===
        debug!("步骤 1: 解析载荷");
        let batch = self.parser.parse(payload)?;
        info!(layout = ?batch.layout, rows = batch.records.len(), "载荷解析完成");

        // === 步骤 2: 逐行归一化与校验 ===
        debug!("步骤 2: 类型归一与语法校验");
        let mut rows: Vec<ImportPreviewRow> = batch
            .records
            .iter()
            .map(|record| {
                let code = strip_non_digits(&record.raw_code);
                let check = validate_code(&record.raw_code);

                // 类型裁决: 声明标签归一 → 校验器推断 → 默认 EAN
                let gtin_type = record
                    .declared_type
                    .as_deref()
                    .and_then(normalize_type_label)
                    .or(check.detected_type)
                    .unwrap_or(GtinType::Ean);

                ImportPreviewRow {
                    row_number: record.row_number,
                    code,
                    gtin_type,
                    valid: check.valid,
                    duplicate_in_batch: false,
                    pool_conflict: false,
                    notes: record.notes.clone(),
                }
            })
            .collect();

        // === 步骤 3: 批内重复检测（在全部行上计算，不限于合法行） ===
        debug!("步骤 3: 批内重复检测");
        let mut occurrences: HashMap<&str, usize> = HashMap::new();
        for row in &rows {
            if !row.code.is_empty() {
                *occurrences.entry(row.code.as_str()).or_insert(0) += 1;
            }
        }
        let duplicate_set: HashSet<String> = occurrences
            .iter()
            .filter(|(_, &count)| count > 1)
            .map(|(code, _)| code.to_string())
            .collect();

        // === 步骤 4: 池冲突检测（任意状态的现存条目均算冲突） ===
        debug!("步骤 4: 池冲突检测");
        let distinct_codes: Vec<String> = {
            let mut seen = HashSet::new();
            rows.iter()
                .filter(|r| !r.code.is_empty())
                .filter(|r| seen.insert(r.code.clone()))
                .map(|r| r.code.clone())
                .collect()
        };
        let conflict_set: HashSet<String> = self
            .store
            .filter_existing_codes(&distinct_codes)
            .await
            .map_err(|e| ImportError::DatabaseQueryError(e.to_string()))?
            .into_iter()
            .collect();

        // === 步骤 5: 回填标记并汇总 ===
        let mut valid = 0;
        let mut invalid = 0;
        for row in &mut rows {
            row.duplicate_in_batch = duplicate_set.contains(&row.code);
            row.pool_conflict = !row.code.is_empty() && conflict_set.contains(&row.code);
            if row.valid {
                valid += 1;
            } else {
                invalid += 1;
            }
        }

        // 集合按首次出现顺序输出，便于预览界面稳定展示
        let duplicates: Vec<String> = {
            let mut seen = HashSet::new();
            rows.iter()
                .filter(|r| r.duplicate_in_batch && seen.insert(r.code.clone()))
                .map(|r| r.code.clone())
                .collect()
        };
        let conflicts: Vec<String> = {
            let mut seen = HashSet::new();
            rows.iter()
                .filter(|r| r.pool_conflict && seen.insert(r.code.clone()))
                .map(|r| r.code.clone())
                .collect()
        };

        info!(
            total = rows.len(),
            valid = valid,
            invalid = invalid,
            duplicates = duplicates.len(),
            conflicts = conflicts.len(),
            "导入预览生成完成"
        );

        Ok(ImportPreview {
            rows,
            duplicates,
            conflicts,
            valid,
            invalid,
        })
    }

    /// 确认落库
    ///
    /// 仅写入 valid = true 且非池冲突的行，status = AVAILABLE。
    /// 批内重复不在此处额外过滤——唯一约束裁决第二次插入，
    /// 按 AlreadyExists（良性）归档，继续提交剩余行；重试因此天然幂等。
    /// 类型检查约束违反逐行上报（携带违规值），同样不中断批次。
    pub async fn commit(&self, payload: &str, actor: &str) -> ImportResult<CommitOutcome> {
        let preview = self.preview(payload).await?;

        let mut inserted = Vec::new();
        let mut already_existed = Vec::new();
        let mut type_errors = Vec::new();

        for row in preview
            .rows
            .iter()
            .filter(|r| r.valid && !r.pool_conflict)
        {
            let new_entry = NewPoolEntry {
                code: Some(row.code.clone()),
                gtin_type: row.gtin_type,
                notes: row.notes.clone(),
            };

            match self.store.insert_entry(new_entry, actor).await {
                Ok(_) => inserted.push(row.code.clone()),
                Err(RepositoryError::AlreadyExists { code }) => {
                    // 预检查与写入之间可能被并发导入抢先，按良性处理
                    debug!(row = row.row_number, code = %code, "码值已存在，跳过");
                    already_existed.push(code);
                }
                Err(RepositoryError::InvalidTypeValue { value }) => {
                    warn!(row = row.row_number, code = %row.code, value = %value, "类型约束违反");
                    type_errors.push(TypeErrorDetail {
                        code: row.code.clone(),
                        attempted_type: value,
                    });
                }
                Err(e) => {
                    // 基础设施级失败才中断；已落库的行保持不回滚
                    return Err(ImportError::DatabaseQueryError(e.to_string()));
                }
            }
        }

        info!(
            inserted = inserted.len(),
            already_existed = already_existed.len(),
            type_errors = type_errors.len(),
            invalid = preview.invalid,
            "导入落库完成"
        );

        Ok(CommitOutcome {
            inserted,
            already_existed,
            type_errors,
            invalid: preview.invalid,
        })
    }
}

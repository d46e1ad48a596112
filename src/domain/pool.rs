// ==========================================
// 供应链经营管理系统 - 条码池实体与导入 DTO
// ==========================================
// 红线: PoolEntry 由仓储层独占持有，分配/释放只经由定义好的事务入口
// ==========================================

use crate::domain::types::{GtinType, PoolStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// PoolEntry - 条码池条目
// ==========================================
/// 条码池中的一个可分配资源单元
///
/// 不变式：
/// - status = ASSIGNED ⇔ owner_ref 非空 ⇔ assigned_at 非空
/// - code 仅在 type = GTIN_EXEMPT 时允许为空
/// - 非空 code 全池唯一（由数据库 UNIQUE 约束执行）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolEntry {
    /// 条目ID（uuid，创建时生成，不可变）
    pub id: String,
    /// 数字码（EAN-13 / UPC-12）
    pub code: Option<String>,
    /// 条码类型
    pub gtin_type: GtinType,
    /// 生命周期状态
    pub status: PoolStatus,
    /// 当前持有项目（仅 ASSIGNED 时非空）
    pub owner_ref: Option<String>,
    /// 分配时间（仅 ASSIGNED 时非空）
    pub assigned_at: Option<DateTime<Utc>>,
    /// 备注
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
    pub updated_at: DateTime<Utc>,
    pub updated_by: String,
}

/// 新建条目的写入参数（id/时间戳由仓储生成）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPoolEntry {
    pub code: Option<String>,
    pub gtin_type: GtinType,
    pub notes: Option<String>,
}

// ==========================================
// 分配补丁 (Owner Patch)
// ==========================================
/// 条件更新时一并写入的持有者字段
///
/// 分配时两项均为 Some，释放时均为 None。
#[derive(Debug, Clone, Default)]
pub struct OwnerPatch {
    pub owner_ref: Option<String>,
    pub assigned_at: Option<DateTime<Utc>>,
}

// ==========================================
// 池概览 (Pool Summary)
// ==========================================
/// 按状态统计的池概览（看板卡片用）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolSummary {
    pub available: i64,
    pub assigned: i64,
    pub archived: i64,
    pub total: i64,
}

// ==========================================
// 导入预览 (Import Preview)
// ==========================================
/// 单行解析结果（瞬态，不落库）
///
/// duplicate_in_batch / pool_conflict 为独立标记，
/// 与 valid 三者互不排斥，计数不要求加总等于行数。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportPreviewRow {
    /// 原始文件中的 1 基行号（含表头行）
    pub row_number: usize,
    /// 剥离非数字字符后的码值（无数字时为空串）
    pub code: String,
    /// 归一化后的类型（归一失败时回退校验器推断，双双失败默认 EAN）
    pub gtin_type: GtinType,
    /// 码值语法是否合法（12 或 13 位数字）
    pub valid: bool,
    /// 同批次内重复
    pub duplicate_in_batch: bool,
    /// 与现存池条目冲突（任意状态）
    pub pool_conflict: bool,
    /// 备注列（仅 Layout A 携带）
    pub notes: Option<String>,
}

/// 导入预览汇总
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportPreview {
    pub rows: Vec<ImportPreviewRow>,
    /// 同批次内出现多于一次的码值集合
    pub duplicates: Vec<String>,
    /// 与现存池冲突的码值集合
    pub conflicts: Vec<String>,
    /// 语法合法行数
    pub valid: usize,
    /// 语法非法行数
    pub invalid: usize,
}

// ==========================================
// 导入落库结果 (Commit Outcome)
// ==========================================
/// 类型检查约束违反明细（逐行上报，不中断批次）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeErrorDetail {
    pub code: String,
    pub attempted_type: String,
}

/// 落库结果（逐行提交，部分失败不回滚已成功行）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitOutcome {
    /// 新插入的码值
    pub inserted: Vec<String>,
    /// 已存在（唯一约束拒绝，按良性处理）的码值
    pub already_existed: Vec<String>,
    /// 类型约束违反明细
    pub type_errors: Vec<TypeErrorDetail>,
    /// 预览阶段即判定非法的行数
    pub invalid: usize,
}

// ==========================================
// 供应链经营管理系统 - 项目标识记录
// ==========================================
// 说明: 每个项目至多一条，upsert 以 project_ref 为键
// 说明: source_entry_id 只是查询辅助的弱引用，分配事实以池条目为准
// ==========================================

use crate::domain::types::GtinType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// IdentifierRecord - 项目标识记录
// ==========================================
/// 项目侧的标识视图
///
/// gtin_code/gtin_type 可能镜像自某个已分配池条目，
/// 也可能是人工直接录入；释放池条目后本记录保留不动（历史留痕）。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentifierRecord {
    /// 归属项目
    pub project_ref: String,
    pub gtin_type: Option<GtinType>,
    pub gtin_code: Option<String>,
    /// 豁免理由（gtin_type = GTIN_EXEMPT 时必填，否则必须为空）
    pub exemption_reason: Option<String>,
    /// 市场平台标识，不受池规则约束
    pub asin: Option<String>,
    pub fnsku: Option<String>,
    /// 来源池条目的弱引用（非权威，仅查询辅助）
    pub source_entry_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub updated_by: String,
}

// ==========================================
// IdentifierBinding - 绑定状态视图
// ==========================================
/// 加载项目标识时派生出的 UI 侧状态
///
/// sourced_from_pool = true 当且仅当记录中的码值对应一个
/// 当前 ASSIGNED 给本项目的池条目（此时才提供"释放"动作）。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentifierBinding {
    pub record: Option<IdentifierRecord>,
    /// 码值是否由池分配而来（而非人工录入）
    pub sourced_from_pool: bool,
    /// 命中的池条目ID（仅 sourced_from_pool 时非空）
    pub pool_entry_id: Option<String>,
}

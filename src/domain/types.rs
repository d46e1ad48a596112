// ==========================================
// 供应链经营管理系统 - 条码池领域类型定义
// ==========================================
// 红线: 类型枚举为封闭集合，自由文本只在导入归一化入口出现
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 条码类型 (GTIN Type)
// ==========================================
// EAN-13 / UPC-12 / 豁免（无码，需填写豁免理由）
// 序列化格式: SCREAMING_SNAKE_CASE (与数据库一致)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GtinType {
    Ean,        // EAN-13
    Upc,        // UPC-A (12位)
    GtinExempt, // 豁免：无数字码，需豁免理由
}

impl fmt::Display for GtinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GtinType::Ean => write!(f, "EAN"),
            GtinType::Upc => write!(f, "UPC"),
            GtinType::GtinExempt => write!(f, "GTIN_EXEMPT"),
        }
    }
}

impl GtinType {
    /// 从数据库字符串解析
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "EAN" => Some(GtinType::Ean),
            "UPC" => Some(GtinType::Upc),
            "GTIN_EXEMPT" => Some(GtinType::GtinExempt),
            _ => None,
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            GtinType::Ean => "EAN",
            GtinType::Upc => "UPC",
            GtinType::GtinExempt => "GTIN_EXEMPT",
        }
    }
}

// ==========================================
// 池条目状态 (Pool Status)
// ==========================================
// 状态机: AVAILABLE → ASSIGNED → AVAILABLE（释放回池）
//         AVAILABLE|ASSIGNED → ARCHIVED（终态，不回收码值）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PoolStatus {
    Available, // 可分配（初始态）
    Assigned,  // 已分配给唯一项目
    Archived,  // 已归档（终态，码值保留不再流转）
}

impl fmt::Display for PoolStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PoolStatus::Available => write!(f, "AVAILABLE"),
            PoolStatus::Assigned => write!(f, "ASSIGNED"),
            PoolStatus::Archived => write!(f, "ARCHIVED"),
        }
    }
}

impl PoolStatus {
    /// 从数据库字符串解析
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "AVAILABLE" => Some(PoolStatus::Available),
            "ASSIGNED" => Some(PoolStatus::Assigned),
            "ARCHIVED" => Some(PoolStatus::Archived),
            _ => None,
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            PoolStatus::Available => "AVAILABLE",
            PoolStatus::Assigned => "ASSIGNED",
            PoolStatus::Archived => "ARCHIVED",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gtin_type_db_round_trip() {
        for t in [GtinType::Ean, GtinType::Upc, GtinType::GtinExempt] {
            assert_eq!(GtinType::from_db_str(t.to_db_str()), Some(t));
        }
        assert_eq!(GtinType::from_db_str("ISBN"), None);
    }

    #[test]
    fn test_pool_status_db_round_trip() {
        for s in [PoolStatus::Available, PoolStatus::Assigned, PoolStatus::Archived] {
            assert_eq!(PoolStatus::from_db_str(s.to_db_str()), Some(s));
        }
        assert_eq!(PoolStatus::from_db_str("RETIRED"), None);
    }
}

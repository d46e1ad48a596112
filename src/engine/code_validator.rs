// ==========================================
// 供应链经营管理系统 - 条码语法校验器
// ==========================================
// 职责: 判定原始字符串是否为合法 GTIN 族码值并推断类型
// 红线: 纯函数、全函数，任何输入都不 panic，解析不了就是 invalid
// ==========================================

use crate::domain::types::GtinType;
use serde::{Deserialize, Serialize};

/// 校验结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeCheck {
    pub valid: bool,
    /// 按位数推断的类型（12 位 → UPC，13 位 → EAN，其余 None）
    pub detected_type: Option<GtinType>,
}

/// 剥离所有非数字字符
pub fn strip_non_digits(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// 校验原始码值
///
/// 规则：剥离非数字后，长度恰为 12（UPC）或 13（EAN）为合法，
/// 其他长度（含 0）一律非法。
pub fn validate_code(raw: &str) -> CodeCheck {
    let digits = strip_non_digits(raw);
    match digits.len() {
        12 => CodeCheck {
            valid: true,
            detected_type: Some(GtinType::Upc),
        },
        13 => CodeCheck {
            valid: true,
            detected_type: Some(GtinType::Ean),
        },
        _ => CodeCheck {
            valid: false,
            detected_type: None,
        },
    }
}

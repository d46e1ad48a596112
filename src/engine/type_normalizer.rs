// ==========================================
// 供应链经营管理系统 - 类型标签归一化
// ==========================================
// 职责: 把供应商表格里五花八门的类型标签映射到封闭枚举
// 说明: 识别不了返回 None，由调用方回退到校验器推断类型，
//       归一化失败只影响单行，绝不导致整批导入失败
// ==========================================

use crate::domain::types::GtinType;

/// 归一化自由文本类型标签
///
/// 处理：TRIM + UPPER 后查同义词表（封闭集合）。
/// 表外的任何值（含空串）返回 None。
pub fn normalize_type_label(label: &str) -> Option<GtinType> {
    let normalized = label.trim().to_uppercase();

    match normalized.as_str() {
        // EAN-13 族
        "EAN" | "EAN13" | "EAN-13" | "GTIN13" | "GTIN-13" => Some(GtinType::Ean),
        // UPC-A 族
        "UPC" | "UPCA" | "UPC-A" | "UPC12" | "UPC-12" | "GTIN12" | "GTIN-12" => {
            Some(GtinType::Upc)
        }
        // 豁免
        "GTIN_EXEMPT" | "GTIN EXEMPT" | "EXEMPT" | "EXEMPTION" => Some(GtinType::GtinExempt),
        _ => None,
    }
}

// ==========================================
// 供应链经营管理系统 - 批量导入文件解析器
// ==========================================
// 支持: UTF-8 逗号分隔文本，字段可选双引号包裹
// 布局: Layout A（遗留格式 gtin_code,gtin_type,notes，可无表头）
//       Layout B（市场格式，含 UPC/EAN 列，EAN 优先）
// 说明: 表头探测大小写不敏感；含 gtin_code 一律按 Layout A 处理，
//       避免同时出现 UPC/EAN 列时产生歧义
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use csv::ReaderBuilder;
use serde::{Deserialize, Serialize};

/// 导入文件布局
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ImportLayout {
    /// 遗留格式: gtin_code, gtin_type, notes（每行一个资源）
    Legacy,
    /// 市场格式: 含 UPC/EAN 列（同行可同时携带，EAN 优先入池）
    Marketplace,
}

/// 单行原始候选记录（解析产物，未经校验）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawCodeRecord {
    /// 原始文件中的 1 基行号（含被消费的表头行）
    pub row_number: usize,
    /// 候选码值原文（布局相关的取列结果，未剥离非数字）
    pub raw_code: String,
    /// 声明的类型标签原文（Layout B 下由来源列决定）
    pub declared_type: Option<String>,
    /// 备注列（仅 Layout A）
    pub notes: Option<String>,
}

/// 解析结果
#[derive(Debug, Clone)]
pub struct ParsedBatch {
    pub layout: ImportLayout,
    pub records: Vec<RawCodeRecord>,
}

// ==========================================
// BatchParser - 解析器实现
// ==========================================
pub struct BatchParser;

// Layout A 默认列序（无表头时）
const LEGACY_CODE_COL: usize = 0;
const LEGACY_TYPE_COL: usize = 1;
const LEGACY_NOTES_COL: usize = 2;

impl BatchParser {
    /// 解析导入载荷为有序原始记录
    ///
    /// 行号以整个文件计（1 基），表头行被消费但占号，
    /// 空白行占号但不产生记录。逐物理行解析，自行维护行号，
    /// 不依赖 csv reader 对空行的跳过行为。
    pub fn parse(&self, payload: &str) -> ImportResult<ParsedBatch> {
        if payload.trim().is_empty() {
            return Err(ImportError::EmptyPayload);
        }

        let mut rows: Vec<(usize, Vec<String>)> = Vec::new();
        for (idx, line) in payload.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }

            let mut reader = ReaderBuilder::new()
                .has_headers(false)
                .flexible(true) // 允许行长度不一致
                .from_reader(line.as_bytes());

            if let Some(result) = reader.records().next() {
                let record = result?;
                let fields: Vec<String> = record.iter().map(|f| f.trim().to_string()).collect();
                if fields.iter().all(|f| f.is_empty()) {
                    continue;
                }
                rows.push((idx + 1, fields));
            }
        }

        if rows.is_empty() {
            return Err(ImportError::EmptyPayload);
        }

        // 表头探测（大小写不敏感）
        let head: Vec<String> = rows[0].1.iter().map(|f| f.to_lowercase()).collect();

        if head.iter().any(|h| h == "gtin_code") {
            // Layout A（带表头）：按表头定位各列
            let code_col = head.iter().position(|h| h == "gtin_code").unwrap_or(LEGACY_CODE_COL);
            let type_col = head.iter().position(|h| h == "gtin_type");
            let notes_col = head.iter().position(|h| h == "notes");
            let records = Self::parse_legacy_rows(&rows[1..], code_col, type_col, notes_col);
            return Ok(ParsedBatch {
                layout: ImportLayout::Legacy,
                records,
            });
        }

        let upc_col = head.iter().position(|h| h == "upc");
        let ean_col = head.iter().position(|h| h == "ean");
        if (upc_col.is_some() || ean_col.is_some()) && !Self::looks_like_data_row(&rows[0].1) {
            // Layout B：UPC/EAN 取列，其余列（SKU/FNSKU 等）忽略。
            // 无表头文件的数据行也可能含 "EAN"/"UPC" 类型标签，
            // 因此首行只要出现纯数字码值就按数据行对待，不当表头消费。
            let records = Self::parse_marketplace_rows(&rows[1..], upc_col, ean_col);
            return Ok(ParsedBatch {
                layout: ImportLayout::Marketplace,
                records,
            });
        }

        // 无可识别表头：按无表头 Layout A 处理，首行即数据
        let records =
            Self::parse_legacy_rows(&rows, LEGACY_CODE_COL, Some(LEGACY_TYPE_COL), Some(LEGACY_NOTES_COL));
        Ok(ParsedBatch {
            layout: ImportLayout::Legacy,
            records,
        })
    }

    /// 判断一行是否像数据行（含非空纯数字单元格，即码值候选）
    fn looks_like_data_row(fields: &[String]) -> bool {
        fields
            .iter()
            .any(|f| !f.is_empty() && f.chars().all(|c| c.is_ascii_digit()))
    }

    fn parse_legacy_rows(
        rows: &[(usize, Vec<String>)],
        code_col: usize,
        type_col: Option<usize>,
        notes_col: Option<usize>,
    ) -> Vec<RawCodeRecord> {
        rows.iter()
            .map(|(line, fields)| {
                let get = |col: usize| fields.get(col).cloned().unwrap_or_default();
                let opt = |col: Option<usize>| {
                    col.map(|c| get(c)).filter(|v| !v.is_empty())
                };

                RawCodeRecord {
                    row_number: *line,
                    raw_code: get(code_col),
                    declared_type: opt(type_col),
                    notes: opt(notes_col),
                }
            })
            .collect()
    }

    fn parse_marketplace_rows(
        rows: &[(usize, Vec<String>)],
        upc_col: Option<usize>,
        ean_col: Option<usize>,
    ) -> Vec<RawCodeRecord> {
        rows.iter()
            .map(|(line, fields)| {
                let get = |col: Option<usize>| {
                    col.and_then(|c| fields.get(c))
                        .map(|v| v.trim().to_string())
                        .filter(|v| !v.is_empty())
                };

                let ean = get(ean_col);
                let upc = get(upc_col);

                // 同行同时携带时 EAN 优先，UPC 值不入池
                let (raw_code, declared_type) = match (ean, upc) {
                    (Some(ean), _) => (ean, Some("EAN".to_string())),
                    (None, Some(upc)) => (upc, Some("UPC".to_string())),
                    (None, None) => (String::new(), None),
                };

                RawCodeRecord {
                    row_number: *line,
                    raw_code,
                    declared_type,
                    notes: None,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_layout_with_header() {
        let payload = "gtin_code,gtin_type,notes\n8437012345678,EAN,Lot GS1\n";
        let parser = BatchParser;
        let batch = parser.parse(payload).unwrap();

        assert_eq!(batch.layout, ImportLayout::Legacy);
        assert_eq!(batch.records.len(), 1);
        assert_eq!(batch.records[0].row_number, 2); // 表头占第 1 行
        assert_eq!(batch.records[0].raw_code, "8437012345678");
        assert_eq!(batch.records[0].declared_type.as_deref(), Some("EAN"));
        assert_eq!(batch.records[0].notes.as_deref(), Some("Lot GS1"));
    }

    #[test]
    fn test_legacy_layout_headerless() {
        let payload = "8437012345678,EAN,备注\n012345678905,UPC,\n";
        let parser = BatchParser;
        let batch = parser.parse(payload).unwrap();

        assert_eq!(batch.layout, ImportLayout::Legacy);
        assert_eq!(batch.records.len(), 2);
        assert_eq!(batch.records[0].row_number, 1); // 无表头，首行即数据
        assert_eq!(batch.records[1].raw_code, "012345678905");
    }

    #[test]
    fn test_marketplace_layout_ean_priority() {
        let payload = "UPC,EAN,SKU,FNSKU\n012345678905,8437012345678,SKU-001,FNSKU-001\n,8437012345679,SKU-002,\n";
        let parser = BatchParser;
        let batch = parser.parse(payload).unwrap();

        assert_eq!(batch.layout, ImportLayout::Marketplace);
        assert_eq!(batch.records.len(), 2);
        // 同行双码: EAN 优先，UPC 丢弃
        assert_eq!(batch.records[0].raw_code, "8437012345678");
        assert_eq!(batch.records[0].declared_type.as_deref(), Some("EAN"));
        // 仅 EAN
        assert_eq!(batch.records[1].raw_code, "8437012345679");
        assert_eq!(batch.records[1].declared_type.as_deref(), Some("EAN"));
    }

    #[test]
    fn test_marketplace_layout_upc_only_row() {
        let payload = "UPC,EAN\n012345678905,\n";
        let parser = BatchParser;
        let batch = parser.parse(payload).unwrap();

        assert_eq!(batch.records[0].raw_code, "012345678905");
        assert_eq!(batch.records[0].declared_type.as_deref(), Some("UPC"));
    }

    #[test]
    fn test_gtin_code_header_wins_over_marketplace() {
        // 同时出现 gtin_code 与 UPC/EAN 列时按 Layout A 处理
        let payload = "gtin_code,UPC,EAN\n8437012345678,111111111111,2222222222222\n";
        let parser = BatchParser;
        let batch = parser.parse(payload).unwrap();

        assert_eq!(batch.layout, ImportLayout::Legacy);
        assert_eq!(batch.records[0].raw_code, "8437012345678");
    }

    #[test]
    fn test_quoted_fields() {
        let payload = "gtin_code,gtin_type,notes\n\"8437012345678\",\"EAN\",\"批次, 含逗号\"\n";
        let parser = BatchParser;
        let batch = parser.parse(payload).unwrap();

        assert_eq!(batch.records[0].raw_code, "8437012345678");
        assert_eq!(batch.records[0].notes.as_deref(), Some("批次, 含逗号"));
    }

    #[test]
    fn test_headerless_row_with_type_label_not_mistaken_for_marketplace_header() {
        // 数据行的类型列含 "EAN"，不能被误判为 Layout B 表头消费掉
        let payload = "8437012345678,EAN,备注\n";
        let parser = BatchParser;
        let batch = parser.parse(payload).unwrap();

        assert_eq!(batch.layout, ImportLayout::Legacy);
        assert_eq!(batch.records.len(), 1);
        assert_eq!(batch.records[0].row_number, 1);
        assert_eq!(batch.records[0].raw_code, "8437012345678");
        assert_eq!(batch.records[0].declared_type.as_deref(), Some("EAN"));
    }

    #[test]
    fn test_empty_line_consumes_row_number() {
        let payload = "gtin_code,gtin_type,notes\n\n8437012345678,EAN,\n";
        let parser = BatchParser;
        let batch = parser.parse(payload).unwrap();

        assert_eq!(batch.records.len(), 1);
        assert_eq!(batch.records[0].row_number, 3); // 空行占第 2 行
    }

    #[test]
    fn test_skip_blank_rows_keeps_numbering() {
        let payload = "gtin_code,gtin_type,notes\n8437012345678,EAN,\n,,\n8437012345679,EAN,\n";
        let parser = BatchParser;
        let batch = parser.parse(payload).unwrap();

        assert_eq!(batch.records.len(), 2);
        assert_eq!(batch.records[0].row_number, 2);
        assert_eq!(batch.records[1].row_number, 4); // 空白行占号但不产生记录
    }

    #[test]
    fn test_empty_payload() {
        let parser = BatchParser;
        assert!(matches!(
            parser.parse("   \n  "),
            Err(ImportError::EmptyPayload)
        ));
    }
}

// ==========================================
// 计件工资表归一化 - 子表切分 (TableSegmenter)
// ==========================================
// 职责: 以全空行为分隔，把整张工作表切成若干子表
// 规则:
// - 全空行: 每个单元格都等于 ""
// - 连续多个空行只算一次分隔
// - 块首行有非空白内容 → 作为子表表头；否则沿用整表表头
// - 空子表（无数据行）照常输出，由调用方记录
// ==========================================

use crate::domain::Table;
use crate::importer::grid_assembler::dedup_labels;

fn is_blank_row(row: &[String]) -> bool {
    row.iter().all(|cell| cell.is_empty())
}

fn has_text(row: &[String]) -> bool {
    row.iter().any(|cell| !cell.trim().is_empty())
}

/// 切分整表
///
/// # 参数
/// - sheet: GridAssembler 组装后的整表（列名为工作表首行去重结果）
///
/// # 返回
/// - 按出现顺序排列的子表（可能为空列表）
pub fn segment(sheet: &Table) -> Vec<Table> {
    let mut tables = Vec::new();
    let mut block: Vec<Vec<String>> = Vec::new();

    for row in sheet.rows() {
        if is_blank_row(row) {
            if !block.is_empty() {
                tables.push(close_block(std::mem::take(&mut block), sheet.columns()));
            }
        } else {
            block.push(row.clone());
        }
    }

    if !block.is_empty() {
        tables.push(close_block(block, sheet.columns()));
    }

    tables
}

fn close_block(mut block: Vec<Vec<String>>, sheet_header: &[String]) -> Table {
    let width = block.iter().map(Vec::len).max().unwrap_or(0);
    for row in &mut block {
        row.resize(width, String::new());
    }

    let (header, data) = if has_text(&block[0]) {
        let data = block.split_off(1);
        let header = block.into_iter().next().unwrap_or_default();
        (header, data)
    } else {
        let mut header: Vec<String> = sheet_header.iter().take(width).cloned().collect();
        header.resize(width, String::new());
        (header, block)
    };

    Table::new(dedup_labels(header), data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::importer::grid_assembler::assemble;

    fn s(v: &[&str]) -> Vec<String> {
        v.iter().map(|x| x.to_string()).collect()
    }

    fn sheet(rows: Vec<Vec<String>>) -> Table {
        let header = rows.first().cloned().unwrap_or_default();
        assemble(rows, header)
    }

    #[test]
    fn test_no_blank_rows_yields_single_table() {
        let t = sheet(vec![s(&["型号", "金额"]), s(&["X1", "1"]), s(&["X2", "2"])]);
        let parts = segment(&t);
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].columns(), &s(&["型号", "金额"])[..]);
        assert_eq!(parts[0].height(), 2);
    }

    #[test]
    fn test_consecutive_blank_rows_collapse() {
        let t = sheet(vec![
            s(&["型号", "金额"]),
            s(&["X1", "1"]),
            s(&["", ""]),
            s(&["", ""]),
            s(&["", ""]),
            s(&["职员全名", "金额"]),
            s(&["张三", "5"]),
            s(&["", ""]),
        ]);
        let parts = segment(&t);
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[1].columns(), &s(&["职员全名", "金额"])[..]);
        assert_eq!(parts[1].rows()[0], s(&["张三", "5"]));
    }

    #[test]
    fn test_whitespace_only_first_row_reuses_sheet_header() {
        // 块首行只有空白 → 非空行（不是分隔），但也不能当表头
        let t = sheet(vec![
            s(&["型号", "金额"]),
            s(&["X1", "1"]),
            s(&["", ""]),
            s(&[" ", ""]),
            s(&["X2", "2"]),
        ]);
        let parts = segment(&t);
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[1].columns(), &s(&["型号", "金额"])[..]);
        assert_eq!(parts[1].height(), 2);
    }

    #[test]
    fn test_header_only_block_is_emitted_empty() {
        let t = sheet(vec![s(&["型号", "金额"]), s(&["", ""]), s(&["备注", ""])]);
        let parts = segment(&t);
        assert_eq!(parts.len(), 2);
        assert!(parts[0].is_empty());
        assert!(parts[1].is_empty());
        assert_eq!(parts[1].columns(), &s(&["备注", ""])[..]);
    }

    #[test]
    fn test_block_header_is_deduplicated() {
        let t = sheet(vec![s(&["金额", "金额", ""]), s(&["1", "2", ""])]);
        let parts = segment(&t);
        assert_eq!(parts[0].columns(), &s(&["金额", "金额_1", ""])[..]);
    }

    #[test]
    fn test_empty_sheet() {
        assert!(segment(&Table::default()).is_empty());
    }
}

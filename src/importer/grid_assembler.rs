// ==========================================
// 计件工资表归一化 - 网格组装 (GridAssembler)
// ==========================================
// 职责: 行数据 + 原始表头 → 带唯一列名的表格
// 规则:
// - 所有行补齐到最长行长度
// - 表头不足时补 `Column_<i>`
// - 重名列依次追加 `_1`, `_2`, ...
// ==========================================

use crate::domain::{RawGrid, Table};
use std::collections::{HashMap, HashSet};

/// 组装整表
pub fn assemble(rows: Vec<Vec<String>>, headers: Vec<String>) -> Table {
    let grid = RawGrid::from_rows(rows);
    let width = grid.width();

    let mut labels = headers;
    if labels.len() < width {
        let start = labels.len();
        labels.extend((start..width).map(|i| format!("Column_{}", i)));
    }
    // 空表不保留列名；表头比数据宽时保留多出的列名
    if grid.height() == 0 {
        labels.clear();
    }

    Table::new(dedup_labels(labels), grid.into_rows())
}

/// 列名去重: 首次出现保持原样，之后按出现顺序追加 `_n`
///
/// 生成的名字若与已有列名冲突则继续递增，保证结果唯一
pub fn dedup_labels<I: IntoIterator<Item = String>>(labels: I) -> Vec<String> {
    let labels: Vec<String> = labels.into_iter().collect();
    let mut used: HashSet<String> = HashSet::with_capacity(labels.len());
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut out = Vec::with_capacity(labels.len());

    for label in labels {
        if used.insert(label.clone()) {
            counts.entry(label.clone()).or_insert(0);
            out.push(label);
            continue;
        }
        let counter = counts.entry(label.clone()).or_insert(0);
        let unique = loop {
            *counter += 1;
            let candidate = format!("{}_{}", label, counter);
            if !used.contains(&candidate) {
                break candidate;
            }
        };
        used.insert(unique.clone());
        out.push(unique);
    }
    out
}

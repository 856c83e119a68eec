// ==========================================
// 计件工资表归一化 - 表格结构
// ==========================================
// RawGrid: 整张工作表的矩形网格（行补齐到最大列数）
// Table:   列名 + 行数据，按位置对齐（构造时保证）
// ==========================================

use serde::Serialize;
use std::fmt;

// ==========================================
// RawGrid - 整表网格
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawGrid {
    rows: Vec<Vec<String>>,
    width: usize,
}

impl RawGrid {
    /// 以最长行为准补齐所有行（空字符串填充）
    pub fn from_rows(mut rows: Vec<Vec<String>>) -> Self {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        for row in &mut rows {
            row.resize(width, String::new());
        }
        Self { rows, width }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<Vec<String>> {
        self.rows
    }
}

// ==========================================
// Table - 带列名的表格（整表或子表）
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// 创建表格；每行截断/补齐到列数，保证位置对齐
    pub fn new(columns: Vec<String>, mut rows: Vec<Vec<String>>) -> Self {
        let width = columns.len();
        for row in &mut rows {
            row.resize(width, String::new());
        }
        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// 无数据行
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn first_column(&self) -> Option<&str> {
        self.columns.first().map(String::as_str)
    }

    pub fn column_index(&self, label: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == label)
    }

    pub fn has_column(&self, label: &str) -> bool {
        self.column_index(label).is_some()
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row).and_then(|r| r.get(col)).map(String::as_str)
    }

    pub fn column_values(&self, col: usize) -> impl Iterator<Item = &str> + '_ {
        self.rows
            .iter()
            .map(move |r| r.get(col).map(String::as_str).unwrap_or(""))
    }

    pub fn rename_column(&mut self, col: usize, label: &str) {
        if let Some(c) = self.columns.get_mut(col) {
            *c = label.to_string();
        }
    }

    /// 将所有名为 `from` 的列改名为 `to`，返回改名列数
    pub fn rename_all(&mut self, from: &str, to: &str) -> usize {
        let mut renamed = 0;
        for c in self.columns.iter_mut().filter(|c| c.as_str() == from) {
            *c = to.to_string();
            renamed += 1;
        }
        renamed
    }

    pub fn set_column_labels<F: FnMut(&str) -> String>(&mut self, mut f: F) {
        for c in &mut self.columns {
            *c = f(c);
        }
    }

    /// 将整列设为同一值
    pub fn fill_column(&mut self, col: usize, value: &str) {
        for row in &mut self.rows {
            if let Some(cell) = row.get_mut(col) {
                *cell = value.to_string();
            }
        }
    }

    /// 追加一列（每行同一值）
    pub fn push_column(&mut self, label: &str, value: &str) {
        self.columns.push(label.to_string());
        for row in &mut self.rows {
            row.push(value.to_string());
        }
    }

    /// 仅保留满足条件的列
    pub fn retain_columns<F: FnMut(&str) -> bool>(&mut self, mut keep: F) {
        let mask: Vec<bool> = self.columns.iter().map(|c| keep(c)).collect();
        let mut idx = 0;
        self.columns.retain(|_| {
            idx += 1;
            mask[idx - 1]
        });
        for row in &mut self.rows {
            let mut idx = 0;
            row.retain(|_| {
                idx += 1;
                mask[idx - 1]
            });
        }
    }

    pub fn rows_mut(&mut self) -> &mut Vec<Vec<String>> {
        &mut self.rows
    }

    pub fn into_parts(self) -> (Vec<String>, Vec<Vec<String>>) {
        (self.columns, self.rows)
    }
}

// 诊断输出（日志转储）用的简单文本格式
impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "    {}", self.columns.join(" | "))?;
        for (i, row) in self.rows.iter().enumerate() {
            writeln!(f, "{:>3} {}", i, row.join(" | "))?;
        }
        Ok(())
    }
}

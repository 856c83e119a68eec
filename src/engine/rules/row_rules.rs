// ==========================================
// 计件工资表归一化 - 行级改写规则
// ==========================================
// 职责: 占位人员名 → 实际人员
// - 前装*: 一行拆成两行，计件数量/金额各减半
// - 中装* / 后装*: 直接替换人员名
// 约束: 逐行审计只记录数值回退；替换次数在子表末尾汇总记录
// ==========================================

use super::column_rules::{AMOUNT, EMPLOYEE, PIECE_COUNT, QUOTA};
use super::{RuleContext, TableRule};
use crate::domain::Table;
use crate::engine::decimal::{halve, parse_decimal};

// ==========================================
// SplitRowRule
// ==========================================
pub struct SplitRowRule {
    pub prefix: &'static str,
    pub successors: [&'static str; 2],
}

impl SplitRowRule {
    /// 减半一个数值单元格；空值保持为空，无法解析取 "0"
    fn halve_cell(value: &str) -> Option<String> {
        if value.is_empty() {
            return Some(String::new());
        }
        parse_decimal(value).map(|d| halve(d).to_string())
    }
}

impl TableRule for SplitRowRule {
    fn name(&self) -> &'static str {
        "split_row"
    }

    fn apply(&self, table: &mut Table, ctx: &mut RuleContext<'_>) {
        let (Some(emp), Some(pieces), Some(amount)) = (
            table.column_index(EMPLOYEE),
            table.column_index(PIECE_COUNT),
            table.column_index(AMOUNT),
        ) else {
            return;
        };
        let quota = table.column_index(QUOTA);

        let rows = std::mem::take(table.rows_mut());
        let mut kept = Vec::with_capacity(rows.len());
        let mut added = Vec::new();
        let mut split_count = 0;

        for (idx, row) in rows.into_iter().enumerate() {
            if !row[emp].starts_with(self.prefix) {
                kept.push(row);
                continue;
            }
            for successor in self.successors {
                let mut new_row = row.clone();
                new_row[emp] = successor.to_string();

                new_row[pieces] = Self::halve_cell(&row[pieces]).unwrap_or_else(|| {
                    let quota_value = quota.map(|q| row[q].as_str()).unwrap_or("N/A");
                    ctx.log(format!(
                        "无效的计件数量值 '{}' 在行 {}，使用默认值0, (定额的值是：{}, 金额的值是：{})",
                        row[pieces], idx, quota_value, row[amount]
                    ));
                    "0".to_string()
                });
                new_row[amount] = Self::halve_cell(&row[amount]).unwrap_or_else(|| {
                    ctx.log(format!(
                        "无效的金额值 '{}' 在行 {}，使用默认值0",
                        row[amount], idx
                    ));
                    "0".to_string()
                });
                added.push(new_row);
            }
            split_count += 1;
        }

        kept.extend(added);
        *table.rows_mut() = kept;

        if split_count > 0 {
            ctx.tally(
                format!(
                    "将'{}'记录拆分为2行: {} 和 {}",
                    self.prefix, self.successors[0], self.successors[1]
                ),
                split_count,
            );
        }
    }
}

// ==========================================
// PrefixReplaceRule
// ==========================================
pub struct PrefixReplaceRule {
    pub prefix: &'static str,
    pub replacement: &'static str,
}

impl TableRule for PrefixReplaceRule {
    fn name(&self) -> &'static str {
        "prefix_replace"
    }

    fn apply(&self, table: &mut Table, ctx: &mut RuleContext<'_>) {
        let Some(emp) = table.column_index(EMPLOYEE) else {
            return;
        };
        let mut replaced = 0;
        for row in table.rows_mut().iter_mut() {
            if row[emp].starts_with(self.prefix) {
                row[emp] = self.replacement.to_string();
                replaced += 1;
            }
        }
        if replaced > 0 {
            ctx.tally(
                format!("将'{}'改为'{}'", self.prefix, self.replacement),
                replaced,
            );
        }
    }
}

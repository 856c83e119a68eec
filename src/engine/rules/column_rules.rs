// ==========================================
// 计件工资表归一化 - 列名改写规则
// ==========================================
// 职责: 修正历年表头命名漂移，统一到规范列名
// 约束: 规则只在实际改名时写审计日志
// ==========================================

use super::sheet_names::compact_sheet_name;
use super::{RuleContext, TableRule};
use crate::domain::Table;

pub const EMPLOYEE: &str = "职员全名";
pub const PIECE_COUNT: &str = "计件数量";
pub const AMOUNT: &str = "金额";
pub const QUOTA: &str = "定额";
pub const MODEL: &str = "型号";
pub const PROCESS_FULL_NAME: &str = "工序全名";

const ASSEMBLY_SHEETS: [&str; 2] = ["喷漆装配", "装配喷漆"];

fn is_assembly_sheet(sheet_name: &str) -> bool {
    let compact = compact_sheet_name(sheet_name);
    ASSEMBLY_SHEETS.contains(&compact.as_str())
}

// ==========================================
// FirstColumnRename
// ==========================================
/// 首列名命中候选集合时改名为目标列
///
/// - `assembly_only`: 仅在装配喷漆类工作表上生效
/// - `fill_value`: 改名后把整列设为该值
pub struct FirstColumnRename {
    pub candidates: &'static [&'static str],
    pub target: &'static str,
    pub assembly_only: bool,
    pub fill_value: Option<&'static str>,
}

impl TableRule for FirstColumnRename {
    fn name(&self) -> &'static str {
        "first_column_rename"
    }

    fn apply(&self, table: &mut Table, ctx: &mut RuleContext<'_>) {
        if self.assembly_only && !is_assembly_sheet(ctx.sheet_name) {
            return;
        }
        let first = match table.first_column() {
            Some(c) if self.candidates.contains(&c) => c.to_string(),
            _ => return,
        };

        table.rename_column(0, self.target);
        match self.fill_value {
            Some(value) => {
                table.fill_column(0, value);
                ctx.log(format!(
                    "将列名 '{}' 替换为 '{}' 并将所有值设为 '{}'",
                    first, self.target, value
                ));
            }
            None => ctx.log(format!("将列名 '{}' 替换为 '{}'", first, self.target)),
        }
    }
}

// ==========================================
// FollowingColumnRename
// ==========================================
/// 紧跟在锚点列之后的列，名字命中候选集合时改名
pub struct FollowingColumnRename {
    pub sheet: Option<&'static str>,
    pub anchor: &'static str,
    pub candidates: &'static [&'static str],
    pub target: &'static str,
}

impl TableRule for FollowingColumnRename {
    fn name(&self) -> &'static str {
        "following_column_rename"
    }

    fn apply(&self, table: &mut Table, ctx: &mut RuleContext<'_>) {
        if let Some(sheet) = self.sheet {
            if ctx.sheet_name != sheet {
                return;
            }
        }
        let Some(anchor_idx) = table.column_index(self.anchor) else {
            return;
        };
        let next = match table.columns().get(anchor_idx + 1) {
            Some(c) if self.candidates.contains(&c.as_str()) => c.clone(),
            _ => return,
        };

        table.rename_all(&next, self.target);
        if self.sheet.is_some() {
            ctx.log(format!("将列名 '{}' 替换为 '{}'", next, self.target));
        } else {
            ctx.log(format!(
                "将列名 '{}' 替换为 '{}' (在'{}'列之后)",
                next, self.target, self.anchor
            ));
        }
    }
}

// ==========================================
// CoOccurrenceRename
// ==========================================
/// 仅当另一列同时存在时改名
pub struct CoOccurrenceRename {
    pub from: &'static str,
    pub to: &'static str,
    pub requires: &'static str,
}

impl TableRule for CoOccurrenceRename {
    fn name(&self) -> &'static str {
        "co_occurrence_rename"
    }

    fn apply(&self, table: &mut Table, ctx: &mut RuleContext<'_>) {
        if !table.has_column(self.from) || !table.has_column(self.requires) {
            return;
        }
        table.rename_all(self.from, self.to);
        ctx.log(format!("将列名 '{}' 替换为 '{}'", self.from, self.to));
    }
}

// ==========================================
// DirectRename
// ==========================================
pub struct DirectRename {
    pub from: &'static str,
    pub to: &'static str,
}

impl TableRule for DirectRename {
    fn name(&self) -> &'static str {
        "direct_rename"
    }

    fn apply(&self, table: &mut Table, ctx: &mut RuleContext<'_>) {
        if table.rename_all(self.from, self.to) > 0 {
            ctx.log(format!("将列名 '{}' 替换为 '{}'", self.from, self.to));
        }
    }
}

// ==========================================
// ContainsRename
// ==========================================
/// 列名包含目标串（但不等于）时改为目标串，只改第一个
pub struct ContainsRename {
    pub needle: &'static str,
}

impl TableRule for ContainsRename {
    fn name(&self) -> &'static str {
        "contains_rename"
    }

    fn apply(&self, table: &mut Table, ctx: &mut RuleContext<'_>) {
        let found = table
            .columns()
            .iter()
            .position(|c| c.contains(self.needle) && c != self.needle);
        if let Some(idx) = found {
            let old = table.columns()[idx].clone();
            table.rename_column(idx, self.needle);
            ctx.log(format!(
                "将包含'{}'的列名 '{}' 替换为 '{}'",
                self.needle, old, self.needle
            ));
        }
    }
}

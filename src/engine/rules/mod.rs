// ==========================================
// 计件工资表归一化 - 业务规则引擎 (BusinessRuleEngine)
// ==========================================
// 职责: 按固定顺序对子表执行改名/替换/拆行规则
// 流程:
// 1. 列名去空白、移除占位列
// 2. 工作表名规范化（只做一次，后续规则使用新名）
// 3. 空表或无列 → 直接返回
// 4. 依次执行规则（顺序有意义）
// 5. 输出替换/拆行汇总
// 6. 非空表追加 文件名 / sheet名 两列
// ==========================================

pub mod audit;
pub mod column_rules;
pub mod row_rules;
pub mod sheet_names;

pub use audit::{FileRuleLog, MemoryRuleLog, RuleAuditLog, RuleLogEntry};

use crate::domain::Table;
use crate::engine::projector::clean_column_labels;
use audit::log_rule;
use column_rules::*;
use row_rules::{PrefixReplaceRule, SplitRowRule};
use sheet_names::canonical_sheet_name;
use std::sync::Arc;
use tracing::debug;

pub const FILE_NAME_LABEL: &str = "文件名";
pub const SHEET_NAME_LABEL: &str = "sheet名";

// ==========================================
// RuleContext - 单个子表的规则执行上下文
// ==========================================
pub struct RuleContext<'a> {
    pub file_name: &'a str,
    pub sheet_name: &'a str,
    pub table_index: usize,
    audit: &'a dyn RuleAuditLog,
    tallies: Vec<(String, usize)>,
}

impl<'a> RuleContext<'a> {
    pub fn new(
        file_name: &'a str,
        sheet_name: &'a str,
        table_index: usize,
        audit: &'a dyn RuleAuditLog,
    ) -> Self {
        Self {
            file_name,
            sheet_name,
            table_index,
            audit,
            tallies: Vec::new(),
        }
    }

    /// 写一条审计日志
    pub fn log(&self, description: String) {
        log_rule(
            self.audit,
            self.file_name,
            self.sheet_name,
            self.table_index,
            description,
        );
    }

    /// 记录一条待汇总的计数
    pub fn tally(&mut self, summary: String, count: usize) {
        self.tallies.push((summary, count));
    }

    pub fn into_tallies(self) -> Vec<(String, usize)> {
        self.tallies
    }
}

// ==========================================
// TableRule Trait
// ==========================================
pub trait TableRule: Send + Sync {
    fn name(&self) -> &'static str;

    fn apply(&self, table: &mut Table, ctx: &mut RuleContext<'_>);
}

/// 规则处理结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleApplied {
    pub table: Table,
    pub sheet_name: String,
    pub file_name: String,
}

// ==========================================
// RuleEngine
// ==========================================
pub struct RuleEngine {
    rules: Vec<Box<dyn TableRule>>,
    audit: Arc<dyn RuleAuditLog>,
}

impl RuleEngine {
    pub fn new(rules: Vec<Box<dyn TableRule>>, audit: Arc<dyn RuleAuditLog>) -> Self {
        Self { rules, audit }
    }

    /// 生产规则集
    pub fn standard(audit: Arc<dyn RuleAuditLog>) -> Self {
        Self::new(standard_rules(), audit)
    }

    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// 对一个子表执行全部规则
    pub fn apply(
        &self,
        mut table: Table,
        sheet_name: &str,
        file_name: &str,
        table_index: usize,
    ) -> RuleApplied {
        let removed = clean_column_labels(&mut table);
        if !removed.is_empty() {
            debug!(file = %file_name, sheet = %sheet_name, table_index, ?removed, "移除占位列");
        }

        let sheet_name = match canonical_sheet_name(sheet_name) {
            Some(canonical) => {
                log_rule(
                    self.audit.as_ref(),
                    file_name,
                    sheet_name,
                    table_index,
                    format!("工作表名称映射: '{}' -> '{}'", sheet_name, canonical),
                );
                canonical.to_string()
            }
            None => sheet_name.to_string(),
        };

        if table.is_empty() || table.width() == 0 {
            debug!(file = %file_name, sheet = %sheet_name, table_index, "空子表，跳过规则");
            return RuleApplied {
                table,
                sheet_name,
                file_name: file_name.to_string(),
            };
        }

        let mut ctx = RuleContext::new(file_name, &sheet_name, table_index, self.audit.as_ref());
        for rule in &self.rules {
            rule.apply(&mut table, &mut ctx);
        }

        let tallies = std::mem::take(&mut ctx.tallies);
        for (summary, count) in tallies {
            ctx.log(format!("{} 共{}次", summary, count));
        }

        if !table.is_empty() {
            stamp(&mut table, FILE_NAME_LABEL, file_name);
            stamp(&mut table, SHEET_NAME_LABEL, &sheet_name);
        }

        RuleApplied {
            table,
            sheet_name,
            file_name: file_name.to_string(),
        }
    }
}

fn stamp(table: &mut Table, label: &str, value: &str) {
    match table.column_index(label) {
        Some(idx) => table.fill_column(idx, value),
        None => table.push_column(label, value),
    }
}

fn standard_rules() -> Vec<Box<dyn TableRule>> {
    vec![
        Box::new(FirstColumnRename {
            candidates: &["前装", "中装", "后装", "刘雷", "装配"],
            target: EMPLOYEE,
            assembly_only: true,
            fill_value: None,
        }),
        Box::new(FirstColumnRename {
            candidates: &["后装曾大军"],
            target: EMPLOYEE,
            assembly_only: true,
            fill_value: Some("曾大军"),
        }),
        Box::new(FirstColumnRename {
            candidates: &["姓名"],
            target: EMPLOYEE,
            assembly_only: false,
            fill_value: None,
        }),
        Box::new(FollowingColumnRename {
            sheet: Some("绕嵌排"),
            anchor: MODEL,
            candidates: &["嵌线", "排线", "工序名称"],
            target: PROCESS_FULL_NAME,
        }),
        Box::new(CoOccurrenceRename {
            from: "数量",
            to: PIECE_COUNT,
            requires: EMPLOYEE,
        }),
        Box::new(DirectRename {
            from: "加工型号",
            to: MODEL,
        }),
        Box::new(ContainsRename {
            needle: PIECE_COUNT,
        }),
        Box::new(DirectRename {
            from: "单位工资",
            to: QUOTA,
        }),
        Box::new(DirectRename {
            from: "合计金额",
            to: AMOUNT,
        }),
        Box::new(DirectRename {
            from: "规格",
            to: MODEL,
        }),
        Box::new(FollowingColumnRename {
            sheet: None,
            anchor: QUOTA,
            candidates: &["合计"],
            target: AMOUNT,
        }),
        Box::new(DirectRename {
            from: "任务名称",
            to: "客户名称",
        }),
        Box::new(SplitRowRule {
            prefix: "前装",
            successors: ["黄志梅", "陈会清"],
        }),
        Box::new(PrefixReplaceRule {
            prefix: "中装",
            replacement: "李兆军",
        }),
        Box::new(PrefixReplaceRule {
            prefix: "后装",
            replacement: "汤雅林",
        }),
    ]
}

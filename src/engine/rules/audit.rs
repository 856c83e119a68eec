// ==========================================
// 计件工资表归一化 - 业务规则审计日志 (RuleLog)
// ==========================================
// 职责: 记录每一次实际修改子表的规则应用
// 约束: 只追加，流水线自身从不回读
// 格式: `时间 | 文件名 | 工作表 | 表序号 | 描述`
// ==========================================

use chrono::{Local, NaiveDateTime};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::{info, warn};

/// 审计日志条目
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleLogEntry {
    pub timestamp: NaiveDateTime,
    pub file_name: String,
    pub sheet_name: String,
    pub table_index: usize,
    pub description: String,
}

impl RuleLogEntry {
    pub fn to_line(&self) -> String {
        format!(
            "{} | {} | {} | {} | {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            self.file_name,
            self.sheet_name,
            self.table_index,
            self.description
        )
    }
}

// ==========================================
// RuleAuditLog Trait
// ==========================================
pub trait RuleAuditLog: Send + Sync {
    fn record(&self, entry: &RuleLogEntry);
}

/// 构造条目并写入审计日志，同时输出 tracing 事件
pub fn log_rule(
    audit: &dyn RuleAuditLog,
    file_name: &str,
    sheet_name: &str,
    table_index: usize,
    description: String,
) {
    let entry = RuleLogEntry {
        timestamp: Local::now().naive_local(),
        file_name: file_name.to_string(),
        sheet_name: sheet_name.to_string(),
        table_index,
        description,
    };
    info!(
        file = %entry.file_name,
        sheet = %entry.sheet_name,
        table_index,
        "特殊逻辑: {}",
        entry.description
    );
    audit.record(&entry);
}

// ==========================================
// FileRuleLog - 追加写文件
// ==========================================
pub struct FileRuleLog {
    path: PathBuf,
}

impl FileRuleLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RuleAuditLog for FileRuleLog {
    fn record(&self, entry: &RuleLogEntry) {
        let result = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .and_then(|mut f| writeln!(f, "{}", entry.to_line()));
        // 审计文件写失败不影响数据处理
        if let Err(e) = result {
            warn!(path = %self.path.display(), error = %e, "规则审计日志写入失败");
        }
    }
}

// ==========================================
// MemoryRuleLog - 内存实现（测试/核对用）
// ==========================================
#[derive(Default)]
pub struct MemoryRuleLog {
    entries: Mutex<Vec<RuleLogEntry>>,
}

impl MemoryRuleLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<RuleLogEntry> {
        self.entries.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn descriptions(&self) -> Vec<String> {
        self.entries().into_iter().map(|e| e.description).collect()
    }
}

impl RuleAuditLog for MemoryRuleLog {
    fn record(&self, entry: &RuleLogEntry) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(entry.clone());
        }
    }
}

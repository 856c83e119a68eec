// ==========================================
// 计件工资表归一化 - 流水线配置
// ==========================================
// 职责: 进程启动时构造一次，之后只读
// 来源: 默认值 → JSON 配置文件（可部分覆写）→ 环境变量
// ==========================================

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// 环境变量: 显式指定数据库路径
pub const DB_PATH_ENV: &str = "PAYROLL_DB_PATH";

/// 默认期望列（表头判定依据）
pub const DEFAULT_EXPECTED_COLUMNS: [&str; 11] = [
    "职员全名",
    "日期",
    "客户名称",
    "型号",
    "工序全名",
    "工序",
    "计件数量",
    "系数",
    "定额",
    "金额",
    "备注",
];

/// 表头至少需要命中的期望列数
pub const COMMON_COL_COUNT: usize = 4;

/// 配置模块错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置文件读取失败 ({path}): {message}")]
    ReadError { path: String, message: String },

    #[error("配置文件格式错误 ({path}): {message}")]
    ParseError { path: String, message: String },

    #[error("配置值无效 (key: {key}): {message}")]
    InvalidValue { key: String, message: String },
}

// ==========================================
// PipelineConfig
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// 源文件目录（按顺序查找，先命中者优先）
    pub source_dirs: Vec<PathBuf>,
    /// SQLite 数据库路径
    pub db_path: String,
    /// 业务规则审计日志
    pub rule_log_path: PathBuf,
    /// 运行日志文件（None 表示只输出到终端）
    pub log_file: Option<PathBuf>,
    pub expected_columns: Vec<String>,
    pub min_match: usize,
    /// 工作表名包含这些关键字时整表跳过
    pub skip_sheet_keywords: Vec<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            source_dirs: vec![PathBuf::from("new_payroll"), PathBuf::from("old_payroll")],
            db_path: default_db_path(),
            rule_log_path: PathBuf::from("special_logic_applied.log"),
            log_file: Some(PathBuf::from("log_batch.txt")),
            expected_columns: DEFAULT_EXPECTED_COLUMNS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            min_match: COMMON_COL_COUNT,
            skip_sheet_keywords: vec![
                "汇总".to_string(),
                "统计".to_string(),
                "deleted".to_string(),
            ],
        }
    }
}

impl PipelineConfig {
    /// 加载配置
    ///
    /// # 参数
    /// - path: JSON 配置文件路径（None 时使用默认值）
    ///
    /// # 说明
    /// - 配置文件可只包含部分字段，其余取默认值
    /// - 环境变量 `PAYROLL_DB_PATH` 优先于文件中的 db_path
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(p) => Self::from_json_file(p)?,
            None => Self::default(),
        };

        if let Ok(db_path) = std::env::var(DB_PATH_ENV) {
            let trimmed = db_path.trim();
            if !trimmed.is_empty() {
                config.db_path = trimmed.to_string();
            }
        }

        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_json_str(&raw).map_err(|e| match e {
            ConfigError::ParseError { message, .. } => ConfigError::ParseError {
                path: path.display().to_string(),
                message,
            },
            other => other,
        })
    }

    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(raw).map_err(|e| ConfigError::ParseError {
            path: "<inline>".to_string(),
            message: e.to_string(),
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.source_dirs.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "source_dirs".to_string(),
                message: "至少需要一个源文件目录".to_string(),
            });
        }
        if self.expected_columns.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "expected_columns".to_string(),
                message: "期望列不能为空".to_string(),
            });
        }
        Ok(())
    }

    pub fn expected_column_set(&self) -> ExpectedColumnSet {
        ExpectedColumnSet::new(self.expected_columns.iter().cloned(), self.min_match)
    }

    /// 工作表是否在跳过名单内（汇总/统计/已删除）
    pub fn is_skipped_sheet(&self, sheet_name: &str) -> bool {
        self.skip_sheet_keywords
            .iter()
            .any(|kw| sheet_name.contains(kw.as_str()))
    }
}

// ==========================================
// ExpectedColumnSet - 期望列集合 + 命中阈值
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpectedColumnSet {
    names: HashSet<String>,
    min_match: usize,
}

impl ExpectedColumnSet {
    pub fn new<I: IntoIterator<Item = String>>(names: I, min_match: usize) -> Self {
        Self {
            names: names.into_iter().collect(),
            min_match,
        }
    }

    pub fn contains(&self, label: &str) -> bool {
        self.names.contains(label)
    }

    pub fn min_match(&self) -> usize {
        self.min_match
    }

    /// 统计命中期望列的个数（值先去除首尾空白）
    pub fn count_matches<'a, I: IntoIterator<Item = &'a str>>(&self, labels: I) -> usize {
        labels
            .into_iter()
            .filter(|l| self.contains(l.trim()))
            .count()
    }
}

impl Default for ExpectedColumnSet {
    fn default() -> Self {
        Self::new(
            DEFAULT_EXPECTED_COLUMNS.iter().map(|s| s.to_string()),
            COMMON_COL_COUNT,
        )
    }
}

/// 默认数据库路径
///
/// 优先使用用户数据目录；拿不到时回退到当前目录
pub fn default_db_path() -> String {
    let mut path = PathBuf::from("./payroll_database.db");

    if let Some(data_dir) = dirs::data_dir() {
        path = data_dir.join("payroll-normalizer").join("payroll_database.db");
    }

    path.to_string_lossy().to_string()
}

// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 临时数据库、内存工作表读取器、流水线装配
// ==========================================

#![allow(dead_code)]

use payroll_normalizer::config::PipelineConfig;
use payroll_normalizer::engine::{MemoryRuleLog, PipelineDriver, RuleEngine};
use payroll_normalizer::importer::{ImportError, ImportResult, RawSheet, SheetReader};
use payroll_normalizer::repository::{PayrollSink, SqlitePayrollRepository};
use std::collections::BTreeMap;
use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::NamedTempFile;

/// 创建临时测试数据库并建表
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file.path().to_str().unwrap().to_string();

    let repo = SqlitePayrollRepository::new(&db_path)?;
    repo.ensure_tables()?;

    Ok((temp_file, db_path))
}

/// 把字符串切片表格转为行
pub fn rows(data: &[&[&str]]) -> Vec<Vec<String>> {
    data.iter()
        .map(|r| r.iter().map(|c| c.to_string()).collect())
        .collect()
}

// ==========================================
// MemorySheetReader - 内存工作表读取器
// ==========================================
type SheetData = Result<Vec<Vec<String>>, String>;

#[derive(Default)]
pub struct MemorySheetReader {
    files: BTreeMap<String, Result<Vec<(String, SheetData)>, String>>,
}

impl MemorySheetReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加一个工作表（文件不存在时自动创建）
    pub fn with_sheet(mut self, file: &str, sheet: &str, data: Vec<Vec<String>>) -> Self {
        if let Ok(sheets) = self
            .files
            .entry(file.to_string())
            .or_insert_with(|| Ok(Vec::new()))
        {
            sheets.push((sheet.to_string(), Ok(data)));
        }
        self
    }

    /// 添加一个读取时报错的工作表
    pub fn with_broken_sheet(mut self, file: &str, sheet: &str, message: &str) -> Self {
        if let Ok(sheets) = self
            .files
            .entry(file.to_string())
            .or_insert_with(|| Ok(Vec::new()))
        {
            sheets.push((sheet.to_string(), Err(message.to_string())));
        }
        self
    }

    /// 添加一个无法打开的文件
    pub fn with_broken_file(mut self, file: &str, message: &str) -> Self {
        self.files.insert(file.to_string(), Err(message.to_string()));
        self
    }

    fn sheets(&self, file_name: &str) -> ImportResult<&Vec<(String, SheetData)>> {
        match self.files.get(file_name) {
            None => Err(ImportError::FileNotFound {
                file: file_name.to_string(),
                searched: "memory".to_string(),
            }),
            Some(Err(message)) => Err(ImportError::ExcelParseError(message.clone())),
            Some(Ok(sheets)) => Ok(sheets),
        }
    }
}

impl SheetReader for MemorySheetReader {
    fn locate(&self, file_name: &str) -> ImportResult<PathBuf> {
        if self.files.contains_key(file_name) {
            Ok(PathBuf::from(file_name))
        } else {
            Err(ImportError::FileNotFound {
                file: file_name.to_string(),
                searched: "memory".to_string(),
            })
        }
    }

    fn discover_files(&self) -> ImportResult<Vec<String>> {
        Ok(self.files.keys().cloned().collect())
    }

    fn sheet_names(&self, file_name: &str) -> ImportResult<Vec<String>> {
        Ok(self.sheets(file_name)?.iter().map(|(n, _)| n.clone()).collect())
    }

    fn read_sheet(&self, file_name: &str, sheet_name: &str) -> ImportResult<RawSheet> {
        let sheets = self.sheets(file_name)?;
        let (_, data) = sheets
            .iter()
            .find(|(n, _)| n == sheet_name)
            .ok_or_else(|| ImportError::SheetReadError {
                file: file_name.to_string(),
                sheet: sheet_name.to_string(),
                message: "工作表不存在".to_string(),
            })?;
        match data {
            Ok(rows) => Ok(RawSheet::from_rows(rows.clone())),
            Err(message) => Err(ImportError::SheetReadError {
                file: file_name.to_string(),
                sheet: sheet_name.to_string(),
                message: message.clone(),
            }),
        }
    }
}

// ==========================================
// 流水线装配
// ==========================================
pub struct TestPipeline {
    pub driver: PipelineDriver<MemorySheetReader, SqlitePayrollRepository>,
    pub repo: Arc<SqlitePayrollRepository>,
    pub rule_log: Arc<MemoryRuleLog>,
    _db_file: NamedTempFile,
}

/// 默认配置（不写日志文件）
pub fn test_config() -> PipelineConfig {
    PipelineConfig {
        log_file: None,
        ..PipelineConfig::default()
    }
}

pub fn build_pipeline(reader: MemorySheetReader, config: PipelineConfig) -> TestPipeline {
    let (db_file, db_path) = create_test_db().unwrap();
    let repo = Arc::new(SqlitePayrollRepository::new(&db_path).unwrap());
    let rule_log = Arc::new(MemoryRuleLog::new());
    let rules = RuleEngine::standard(rule_log.clone());
    let driver = PipelineDriver::new(Arc::new(reader), repo.clone(), Arc::new(config), rules)
        .unwrap();
    TestPipeline {
        driver,
        repo,
        rule_log,
        _db_file: db_file,
    }
}

/// 按写入顺序读取 (职员全名, 型号, 计件数量, 金额, sheet_name)
pub fn fetch_records(repo: &SqlitePayrollRepository) -> Vec<(String, String, f64, f64, String)> {
    repo.with_connection(|conn| {
        let mut stmt = conn.prepare(
            "SELECT employee_full_name, model, piece_count, amount, sheet_name \
             FROM payroll_details ORDER BY rowid",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get(0)?,
                row.get(1)?,
                row.get(2)?,
                row.get(3)?,
                row.get(4)?,
            ))
        })?;
        rows.collect()
    })
    .unwrap()
}

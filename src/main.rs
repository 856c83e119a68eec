// ==========================================
// 计件工资表归一化 - 命令行入口
// ==========================================
// 用法:
//   payroll-normalizer            全量重跑（清空后处理所有源文件）
//   payroll-normalizer <FILE>     只处理一个文件（不清空）
// ==========================================

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use payroll_normalizer::config::PipelineConfig;
use payroll_normalizer::engine::{FileRuleLog, PipelineDriver, PipelineError, RuleEngine};
use payroll_normalizer::importer::{CalamineSheetReader, ImportError, SheetReader};
use payroll_normalizer::logging::{self, LogFormat};
use payroll_normalizer::repository::SqlitePayrollRepository;
use payroll_normalizer::{BatchSummary, APP_NAME, VERSION};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogOutput {
    Text,
    Json,
}

/// 把历年计件工资 Excel 表归一化写入 SQLite
#[derive(Parser)]
#[command(name = "payroll-normalizer", version)]
struct Cli {
    /// 只处理该文件（在源目录中查找）；省略时全量重跑
    file: Option<String>,

    /// JSON 配置文件
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// 数据库路径（优先于配置文件和环境变量）
    #[arg(long, value_name = "PATH")]
    db: Option<String>,

    /// 以 JSON 输出统计结果
    #[arg(long)]
    summary_json: bool,

    /// 终端日志格式
    #[arg(long, value_enum, default_value = "text")]
    log_format: LogOutput,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = PipelineConfig::load(cli.config.as_deref()).context("加载配置失败")?;
    if let Some(db) = cli.db {
        config.db_path = db;
    }

    let format = match cli.log_format {
        LogOutput::Text => LogFormat::Text,
        LogOutput::Json => LogFormat::Json,
    };
    logging::init(config.log_file.as_deref(), format).context("初始化日志失败")?;

    tracing::info!("==================================================");
    tracing::info!("{} v{}", APP_NAME, VERSION);
    tracing::info!("使用数据库: {}", config.db_path);
    tracing::info!("==================================================");

    let reader = Arc::new(CalamineSheetReader::new(config.source_dirs.clone()));
    let sink = Arc::new(
        SqlitePayrollRepository::new(&config.db_path)
            .with_context(|| format!("无法打开数据库: {}", config.db_path))?,
    );
    let rules = RuleEngine::standard(Arc::new(FileRuleLog::new(config.rule_log_path.clone())));
    let config = Arc::new(config);

    let mut driver = PipelineDriver::new(reader.clone(), sink, config, rules)?;

    let result = match cli.file.as_deref() {
        Some(file) => driver.run_single_file(file),
        None => driver.run_full_batch(),
    };

    let summary = match result {
        Ok(summary) => summary,
        Err(PipelineError::Import(ImportError::FileNotFound { file, searched })) => {
            tracing::error!("文件 '{}' 不在源目录中（{}）", file, searched);
            tracing::info!("源目录中可用的文件:");
            for name in reader.discover_files().unwrap_or_default() {
                tracing::info!("  - {}", name);
            }
            std::process::exit(1);
        }
        Err(PipelineError::NoInputFiles) => {
            tracing::warn!("没有可处理的文件");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    print_summary(&summary, cli.summary_json)
}

fn print_summary(summary: &BatchSummary, as_json: bool) -> Result<()> {
    if as_json {
        println!("{}", serde_json::to_string_pretty(summary)?);
        return Ok(());
    }
    println!("文件: {} (失败 {})", summary.files, summary.files_failed);
    println!(
        "工作表: {} (跳过 {}, 读取失败 {})",
        summary.sheets_seen, summary.sheets_skipped, summary.sheets_failed
    );
    println!(
        "子表: {} (丢弃 {})",
        summary.sub_tables, summary.sub_tables_discarded
    );
    println!(
        "装载: 成功 {}, 失败 {}, 写入 {} 行",
        summary.successful_loads, summary.failed_loads, summary.records_written
    );
    Ok(())
}

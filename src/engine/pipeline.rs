// ==========================================
// 计件工资表归一化 - 流水线驱动 (PipelineDriver)
// ==========================================
// 职责: 文件 → 工作表 → 子表 的逐级编排与统计
// 状态: Discovered → Opened → {Segmented → Reconciled → RuleApplied → Projected} → Closed
// 红线:
// - 单个工作表/子表的失败只记录并继续，不中断批处理
// - 只有 sink 不可用、文件列表为空会终止运行
// - 严格串行，子表按切分顺序写入
// ==========================================

use crate::config::{ExpectedColumnSet, PipelineConfig};
use crate::domain::BatchSummary;
use crate::engine::error::{PipelineError, PipelineResult};
use crate::engine::projector::load_into;
use crate::engine::reconciler::{reconcile, BlockOrigin};
use crate::engine::rules::RuleEngine;
use crate::engine::segmenter::segment;
use crate::importer::{assemble, SheetReader};
use crate::repository::PayrollSink;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};
use uuid::Uuid;

// ==========================================
// PipelineDriver
// ==========================================
pub struct PipelineDriver<R, S>
where
    R: SheetReader + ?Sized,
    S: PayrollSink + ?Sized,
{
    reader: Arc<R>,
    sink: Arc<S>,
    config: Arc<PipelineConfig>,
    expected: ExpectedColumnSet,
    rules: RuleEngine,
    summary: BatchSummary,
}

impl<R, S> PipelineDriver<R, S>
where
    R: SheetReader + ?Sized,
    S: PayrollSink + ?Sized,
{
    /// 创建驱动并确保 sink 表存在
    ///
    /// # 错误
    /// - sink 不可用 → PipelineError::Sink（整批终止）
    pub fn new(
        reader: Arc<R>,
        sink: Arc<S>,
        config: Arc<PipelineConfig>,
        rules: RuleEngine,
    ) -> PipelineResult<Self> {
        sink.ensure_tables()?;
        let expected = config.expected_column_set();
        Ok(Self {
            reader,
            sink,
            config,
            expected,
            rules,
            summary: BatchSummary::default(),
        })
    }

    /// 当前累计统计
    pub fn summary(&self) -> &BatchSummary {
        &self.summary
    }

    /// 全量重跑: 清空累计状态与 sink 表，处理所有源文件
    pub fn run_full_batch(&mut self) -> PipelineResult<BatchSummary> {
        self.summary = BatchSummary::default();
        self.sink.truncate_all()?;
        info!("数据库表已清空");

        let files = self.reader.discover_files()?;
        if files.is_empty() {
            warn!("源目录中没有工资表文件");
            return Err(PipelineError::NoInputFiles);
        }
        info!(count = files.len(), "发现待处理文件");

        self.process_files(&files);
        Ok(self.summary.clone())
    }

    /// 处理单个文件，不清空累计状态
    ///
    /// # 错误
    /// - 文件不在任何源目录中 → PipelineError::Import(FileNotFound)
    pub fn run_single_file(&mut self, file_name: &str) -> PipelineResult<BatchSummary> {
        self.reader.locate(file_name)?;
        info!(file = %file_name, "处理单个文件");
        self.process_files(&[file_name.to_string()]);
        Ok(self.summary.clone())
    }

    /// 依次处理文件列表
    pub fn process_files(&mut self, files: &[String]) {
        let run_id = Uuid::new_v4().to_string();
        let start = Instant::now();
        info!(run_id = %run_id, files = files.len(), "批处理开始");

        for file_name in files {
            self.process_file(file_name);
        }

        info!(
            run_id = %run_id,
            elapsed_ms = start.elapsed().as_millis() as u64,
            sheets = self.summary.sheets_seen,
            sub_tables = self.summary.sub_tables,
            successful = self.summary.successful_loads,
            failed = self.summary.failed_loads,
            "批处理结束"
        );
    }

    /// 处理一个文件的全部工作表
    pub fn process_file(&mut self, file_name: &str) {
        info!(file = %file_name, state = "Discovered", "开始处理文件");
        self.summary.files += 1;

        let sheet_names = match self.reader.sheet_names(file_name) {
            Ok(names) => names,
            Err(e) => {
                error!(file = %file_name, error = %e, "文件打开失败，跳过");
                self.summary.files_failed += 1;
                return;
            }
        };
        info!(file = %file_name, state = "Opened", sheets = sheet_names.len(), "文件已打开");

        for sheet_name in &sheet_names {
            if self.config.is_skipped_sheet(sheet_name) {
                info!(file = %file_name, sheet = %sheet_name, "汇总/统计/已删除工作表，跳过");
                self.summary.sheets_skipped += 1;
                continue;
            }
            self.process_sheet(file_name, sheet_name);
        }

        info!(file = %file_name, state = "Closed", "文件处理完成");
    }

    /// 处理一个工作表: 切分 → 校正 → 规则 → 投影写入
    pub fn process_sheet(&mut self, file_name: &str, sheet_name: &str) {
        let raw = match self.reader.read_sheet(file_name, sheet_name) {
            Ok(raw) => raw,
            Err(e) => {
                error!(file = %file_name, sheet = %sheet_name, error = %e, "工作表读取失败，跳过");
                self.summary.sheets_failed += 1;
                return;
            }
        };
        self.summary.sheets_seen += 1;
        info!(file = %file_name, sheet = %sheet_name, "处理工作表");

        let grid = assemble(raw.rows, raw.header);
        let parts = segment(&grid);
        info!(file = %file_name, sheet = %sheet_name, sub_tables = parts.len(), "子表切分完成");

        // table_index 只给校正后保留的子表编号
        let mut table_index = 0;
        for (idx, part) in parts.into_iter().enumerate() {
            let origin = BlockOrigin {
                file_name,
                sheet_name,
                block: idx + 1,
            };
            self.summary.sub_tables += 1;
            if part.is_empty() {
                warn!(file = %file_name, sheet = %sheet_name, block = origin.block, "空子表");
            }

            let Some(table) = reconcile(part, &self.expected, origin).into_table() else {
                warn!(file = %file_name, sheet = %sheet_name, block = origin.block, "子表被丢弃");
                self.summary.sub_tables_discarded += 1;
                continue;
            };
            table_index += 1;

            let applied = self.rules.apply(table, sheet_name, file_name, table_index);
            let outcome = load_into(
                self.sink.as_ref(),
                applied.table,
                &applied.file_name,
                &applied.sheet_name,
                table_index,
            );
            if !outcome.is_success() {
                error!(file = %file_name, sheet = %sheet_name, table_index, ?outcome, "子表装载失败");
            }
            self.summary.record_outcome(&outcome);
        }
    }
}

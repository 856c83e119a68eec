// ==========================================
// 计件工资表归一化 - 批处理统计
// ==========================================

use serde::Serialize;

/// 子表装载结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum LoadOutcome {
    /// 装载成功（写入行数）
    Loaded { rows: usize },
    /// 装载失败（错误描述）
    Failed { reason: String },
}

impl LoadOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, LoadOutcome::Loaded { .. })
    }
}

/// 一次运行的累计统计
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub files: usize,
    pub files_failed: usize,
    pub sheets_seen: usize,
    pub sheets_skipped: usize,
    pub sheets_failed: usize,
    pub sub_tables: usize,
    pub sub_tables_discarded: usize,
    pub successful_loads: usize,
    pub failed_loads: usize,
    pub records_written: usize,
}

impl BatchSummary {
    pub fn record_outcome(&mut self, outcome: &LoadOutcome) {
        match outcome {
            LoadOutcome::Loaded { rows } => {
                self.successful_loads += 1;
                self.records_written += rows;
            }
            LoadOutcome::Failed { .. } => self.failed_loads += 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_outcome_accumulates() {
        let mut summary = BatchSummary::default();
        summary.record_outcome(&LoadOutcome::Loaded { rows: 3 });
        summary.record_outcome(&LoadOutcome::Loaded { rows: 2 });
        summary.record_outcome(&LoadOutcome::Failed {
            reason: "x".to_string(),
        });
        assert_eq!(summary.successful_loads, 2);
        assert_eq!(summary.failed_loads, 1);
        assert_eq!(summary.records_written, 5);
    }
}

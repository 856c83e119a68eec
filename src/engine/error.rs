// ==========================================
// 计件工资表归一化 - 引擎层错误类型
// ==========================================

use crate::domain::LoadLogEntry;
use crate::importer::ImportError;
use crate::repository::RepositoryError;
use thiserror::Error;

/// 子表投影失败（只影响当前子表）
#[derive(Error, Debug)]
pub enum ProjectionError {
    #[error("子表没有任何规范列 (文件 {file}, 工作表 {sheet}, 表 {table_index})")]
    NoValidColumns {
        file: String,
        sheet: String,
        table_index: usize,
        /// 失败前已生成的丢弃列日志
        load_log: Option<LoadLogEntry>,
    },

    #[error("写入失败: {0}")]
    Sink(#[from] RepositoryError),
}

/// 流水线级错误
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("源目录中没有找到任何工资表文件")]
    NoInputFiles,

    #[error(transparent)]
    Import(#[from] ImportError),

    #[error("数据库不可用: {0}")]
    Sink(#[from] RepositoryError),
}

pub type PipelineResult<T> = Result<T, PipelineError>;

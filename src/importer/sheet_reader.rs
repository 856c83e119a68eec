// ==========================================
// 计件工资表归一化 - 工作表读取器
// ==========================================
// 职责: 文件定位 + 工作表枚举 + 单元格网格读取
// 支持: Excel (.xlsx / .xls)，经 CellCoercer 统一为字符串
// ==========================================

use crate::domain::CellValue;
use crate::importer::cell_coercer::coerce;
use crate::importer::error::{ImportError, ImportResult};
use calamine::{open_workbook_auto, Reader};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// 工作表原始内容
///
/// - header: 工作表第一行
/// - rows:   从第一行开始的全部行（含表头行）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawSheet {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawSheet {
    /// 以第一行作为表头构造
    pub fn from_rows(rows: Vec<Vec<String>>) -> Self {
        let header = rows.first().cloned().unwrap_or_default();
        Self { header, rows }
    }
}

// ==========================================
// SheetReader Trait
// ==========================================
// 用途: 表格读取外部能力
// 实现者: CalamineSheetReader（测试中可替换为内存实现）
pub trait SheetReader {
    /// 在源目录中定位文件
    fn locate(&self, file_name: &str) -> ImportResult<PathBuf>;

    /// 列出所有待处理文件名（按名称排序）
    fn discover_files(&self) -> ImportResult<Vec<String>>;

    /// 列出文件中的工作表名
    fn sheet_names(&self, file_name: &str) -> ImportResult<Vec<String>>;

    /// 读取一个工作表
    fn read_sheet(&self, file_name: &str, sheet_name: &str) -> ImportResult<RawSheet>;
}

// ==========================================
// CalamineSheetReader
// ==========================================
pub struct CalamineSheetReader {
    source_dirs: Vec<PathBuf>,
}

impl CalamineSheetReader {
    pub fn new(source_dirs: Vec<PathBuf>) -> Self {
        Self { source_dirs }
    }

    fn check_extension(file_name: &str) -> ImportResult<()> {
        if is_spreadsheet(Path::new(file_name)) {
            Ok(())
        } else {
            Err(ImportError::UnsupportedFormat(file_name.to_string()))
        }
    }
}

impl SheetReader for CalamineSheetReader {
    fn locate(&self, file_name: &str) -> ImportResult<PathBuf> {
        self.source_dirs
            .iter()
            .map(|dir| dir.join(file_name))
            .find(|p| p.is_file())
            .ok_or_else(|| ImportError::FileNotFound {
                file: file_name.to_string(),
                searched: self
                    .source_dirs
                    .iter()
                    .map(|d| d.display().to_string())
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }

    fn discover_files(&self) -> ImportResult<Vec<String>> {
        discover_payroll_files(&self.source_dirs)
    }

    fn sheet_names(&self, file_name: &str) -> ImportResult<Vec<String>> {
        Self::check_extension(file_name)?;
        let path = self.locate(file_name)?;
        let workbook = open_workbook_auto(&path)?;
        Ok(workbook.sheet_names().to_vec())
    }

    fn read_sheet(&self, file_name: &str, sheet_name: &str) -> ImportResult<RawSheet> {
        Self::check_extension(file_name)?;
        let path = self.locate(file_name)?;

        if file_name.to_lowercase().ends_with(".xls") {
            warn!(
                file = %file_name,
                "旧版 .xls 文件: 公式按缓存计算值读取，公式显示值（如 #VALUE!）可能无法保留"
            );
        }

        let sheet_err = |message: String| ImportError::SheetReadError {
            file: file_name.to_string(),
            sheet: sheet_name.to_string(),
            message,
        };

        let mut workbook = open_workbook_auto(&path).map_err(|e| sheet_err(e.to_string()))?;
        let range = workbook
            .worksheet_range(sheet_name)
            .map_err(|e| sheet_err(e.to_string()))?;

        // calamine 的 Range 从第一个非空单元格开始；补回前导空行/空列，
        // 使网格与工作表 A1 对齐
        let (row_offset, col_offset) = range
            .start()
            .map(|(r, c)| (r as usize, c as usize))
            .unwrap_or((0, 0));

        let mut rows: Vec<Vec<String>> = Vec::with_capacity(row_offset + range.height());
        if !range.is_empty() {
            rows.extend((0..row_offset).map(|_| Vec::new()));
        }
        for data_row in range.rows() {
            let mut row = vec![String::new(); col_offset];
            row.extend(data_row.iter().map(|d| coerce(&CellValue::from(d))));
            rows.push(row);
        }

        debug!(file = %file_name, sheet = %sheet_name, rows = rows.len(), "工作表读取完成");
        Ok(RawSheet::from_rows(rows))
    }
}

fn is_spreadsheet(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| matches!(e.to_lowercase().as_str(), "xls" | "xlsx"))
        .unwrap_or(false)
}

/// 在多个源目录中查找 .xls/.xlsx 文件（不区分大小写），按名称排序
///
/// 不存在的目录跳过
pub fn discover_payroll_files(dirs: &[PathBuf]) -> ImportResult<Vec<String>> {
    let mut files = Vec::new();
    for dir in dirs {
        if !dir.is_dir() {
            debug!(dir = %dir.display(), "源目录不存在，跳过");
            continue;
        }
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_file() && is_spreadsheet(&path) {
                if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                    files.push(name.to_string());
                }
            }
        }
    }
    files.sort();
    Ok(files)
}

// ==========================================
// 计件工资表归一化 - 导入层
// ==========================================
// 职责: 工作表读取 → 单元格字符串化 → 整表组装
// 支持: Excel (.xlsx / .xls)
// ==========================================

// 模块声明
pub mod cell_coercer;
pub mod error;
pub mod grid_assembler;
pub mod sheet_reader;

// 重导出核心类型
pub use cell_coercer::coerce;
pub use error::{ImportError, ImportResult};
pub use grid_assembler::{assemble, dedup_labels};
pub use sheet_reader::{discover_payroll_files, CalamineSheetReader, RawSheet, SheetReader};

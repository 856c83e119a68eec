// ==========================================
// 计件工资表归一化 - 领域模型层
// ==========================================
// 职责: 定义网格、表格、规范记录、统计结构
// 红线: 不含数据访问逻辑,不含规则逻辑
// ==========================================

pub mod cell;
pub mod record;
pub mod summary;
pub mod table;

// 重导出核心类型
pub use cell::CellValue;
pub use record::{CanonicalField, CanonicalRecord, FieldKind, LoadLogEntry};
pub use summary::{BatchSummary, LoadOutcome};
pub use table::{RawGrid, Table};

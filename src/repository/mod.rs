// ==========================================
// 计件工资表归一化 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// 职责: 规范记录与丢弃列日志的追加式落库
// 约束: 所有写入使用参数化语句
// ==========================================

pub mod error;
pub mod payroll_repo;

// 重导出核心仓储
pub use error::{RepositoryError, RepositoryResult};
pub use payroll_repo::{PayrollSink, SqlitePayrollRepository, LOAD_LOG_TABLE, PAYROLL_TABLE};

// ==========================================
// 计件工资表归一化 - 核心库
// ==========================================
// 流程: 工作表读取 → 网格组装 → 子表切分 → 表头校正
//       → 业务规则 → 类型投影 → SQLite
// 技术栈: calamine + rust_decimal + SQLite
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 表格与规范记录
pub mod domain;

// 数据仓储层 - 落库
pub mod repository;

// 引擎层 - 切分/校正/规则/投影/编排
pub mod engine;

// 导入层 - 工作表读取
pub mod importer;

// 配置层
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

pub use config::{ExpectedColumnSet, PipelineConfig};
pub use domain::{BatchSummary, CanonicalField, CanonicalRecord, LoadLogEntry, LoadOutcome, Table};
pub use engine::{PipelineDriver, PipelineError, RuleEngine};
pub use importer::{CalamineSheetReader, ImportError, SheetReader};
pub use repository::{PayrollSink, SqlitePayrollRepository};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "计件工资表归一化";

// ==========================================
// 计件工资表归一化 - 配置层
// ==========================================
// 职责: 期望列、阈值、源目录、数据库与日志路径
// 约束: 启动时构造一次，显式传递给各组件，运行期不修改
// ==========================================

pub mod pipeline_config;

pub use pipeline_config::{
    default_db_path, ConfigError, ExpectedColumnSet, PipelineConfig, COMMON_COL_COUNT,
    DB_PATH_ENV, DEFAULT_EXPECTED_COLUMNS,
};

// ==========================================
// 计件工资表归一化 - 引擎层
// ==========================================
// 职责: 子表切分、表头校正、业务规则、类型投影、流水线编排
// 红线: Engine 不拼 SQL，落库只经 PayrollSink
// ==========================================

pub mod decimal;
pub mod error;
pub mod pipeline;
pub mod projector;
pub mod reconciler;
pub mod rules;
pub mod segmenter;

// 重导出核心引擎
pub use error::{PipelineError, PipelineResult, ProjectionError};
pub use pipeline::PipelineDriver;
pub use projector::{
    clean_column_labels, is_placeholder_artifact, load_into, project, Projection,
};
pub use reconciler::{reconcile, BlockOrigin, Reconciled};
pub use rules::{
    FileRuleLog, MemoryRuleLog, RuleApplied, RuleAuditLog, RuleContext, RuleEngine,
    RuleLogEntry, TableRule,
};
pub use segmenter::segment;

// ==========================================
// 计件工资表归一化 - 规范记录模型
// ==========================================
// 对齐: payroll_details / load_log 表
// 字段顺序为固定契约，不得调整
// ==========================================

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ==========================================
// FieldKind - 字段类型
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// 定长文本 CHAR(n)
    Text(usize),
    /// 日期文本（整数样式的值去掉 `.0`）
    DateText(usize),
    /// NUMERIC(10,2)
    Decimal,
}

// ==========================================
// CanonicalField - 规范字段
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CanonicalField {
    FileName,
    SheetName,
    EmployeeFullName,
    Date,
    CustomerName,
    Model,
    ProcessFullName,
    Process,
    PieceCount,
    Coefficient,
    Quota,
    Amount,
    Remark,
    Code,
}

impl CanonicalField {
    /// 规范字段顺序
    pub const ALL: [CanonicalField; 14] = [
        CanonicalField::FileName,
        CanonicalField::SheetName,
        CanonicalField::EmployeeFullName,
        CanonicalField::Date,
        CanonicalField::CustomerName,
        CanonicalField::Model,
        CanonicalField::ProcessFullName,
        CanonicalField::Process,
        CanonicalField::PieceCount,
        CanonicalField::Coefficient,
        CanonicalField::Quota,
        CanonicalField::Amount,
        CanonicalField::Remark,
        CanonicalField::Code,
    ];

    /// 源表中的列名
    pub fn label(self) -> &'static str {
        match self {
            CanonicalField::FileName => "文件名",
            CanonicalField::SheetName => "sheet名",
            CanonicalField::EmployeeFullName => "职员全名",
            CanonicalField::Date => "日期",
            CanonicalField::CustomerName => "客户名称",
            CanonicalField::Model => "型号",
            CanonicalField::ProcessFullName => "工序全名",
            CanonicalField::Process => "工序",
            CanonicalField::PieceCount => "计件数量",
            CanonicalField::Coefficient => "系数",
            CanonicalField::Quota => "定额",
            CanonicalField::Amount => "金额",
            CanonicalField::Remark => "备注",
            CanonicalField::Code => "代码",
        }
    }

    /// 落库列名
    pub fn column_name(self) -> &'static str {
        match self {
            CanonicalField::FileName => "file_name",
            CanonicalField::SheetName => "sheet_name",
            CanonicalField::EmployeeFullName => "employee_full_name",
            CanonicalField::Date => "date",
            CanonicalField::CustomerName => "customer_name",
            CanonicalField::Model => "model",
            CanonicalField::ProcessFullName => "process_full_name",
            CanonicalField::Process => "process",
            CanonicalField::PieceCount => "piece_count",
            CanonicalField::Coefficient => "coefficient",
            CanonicalField::Quota => "quota",
            CanonicalField::Amount => "amount",
            CanonicalField::Remark => "remark",
            CanonicalField::Code => "code",
        }
    }

    pub fn kind(self) -> FieldKind {
        match self {
            CanonicalField::FileName | CanonicalField::SheetName => FieldKind::Text(100),
            CanonicalField::EmployeeFullName => FieldKind::Text(20),
            CanonicalField::Date => FieldKind::DateText(20),
            CanonicalField::CustomerName => FieldKind::Text(60),
            CanonicalField::Model
            | CanonicalField::ProcessFullName
            | CanonicalField::Process
            | CanonicalField::Remark => FieldKind::Text(100),
            CanonicalField::Code => FieldKind::Text(12),
            CanonicalField::PieceCount
            | CanonicalField::Coefficient
            | CanonicalField::Quota
            | CanonicalField::Amount => FieldKind::Decimal,
        }
    }

    /// 建表时的列类型声明
    pub fn sql_type(self) -> String {
        match self.kind() {
            FieldKind::Text(n) | FieldKind::DateText(n) => format!("CHAR({})", n),
            FieldKind::Decimal => "NUMERIC(10,2)".to_string(),
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.label() == label)
    }

    /// 文件名/工作表名由流水线盖章，不属于源数据列
    pub fn is_provenance(self) -> bool {
        matches!(self, CanonicalField::FileName | CanonicalField::SheetName)
    }
}

// ==========================================
// CanonicalRecord - 规范记录（一行输出）
// ==========================================
// 红线: 数值字段固定两位小数；缺失文本为空串、缺失数值为 0.00
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CanonicalRecord {
    pub file_name: String,
    pub sheet_name: String,
    pub employee_full_name: String,
    pub date: String,
    pub customer_name: String,
    pub model: String,
    pub process_full_name: String,
    pub process: String,
    pub piece_count: Decimal,
    pub coefficient: Decimal,
    pub quota: Decimal,
    pub amount: Decimal,
    pub remark: String,
    pub code: String,
}

impl CanonicalRecord {
    /// 按规范字段读取文本形式（数值字段输出两位小数）
    pub fn value_text(&self, field: CanonicalField) -> String {
        match field {
            CanonicalField::FileName => self.file_name.clone(),
            CanonicalField::SheetName => self.sheet_name.clone(),
            CanonicalField::EmployeeFullName => self.employee_full_name.clone(),
            CanonicalField::Date => self.date.clone(),
            CanonicalField::CustomerName => self.customer_name.clone(),
            CanonicalField::Model => self.model.clone(),
            CanonicalField::ProcessFullName => self.process_full_name.clone(),
            CanonicalField::Process => self.process.clone(),
            CanonicalField::PieceCount => self.piece_count.to_string(),
            CanonicalField::Coefficient => self.coefficient.to_string(),
            CanonicalField::Quota => self.quota.to_string(),
            CanonicalField::Amount => self.amount.to_string(),
            CanonicalField::Remark => self.remark.clone(),
            CanonicalField::Code => self.code.clone(),
        }
    }
}

// ==========================================
// LoadLogEntry - 丢弃列日志
// ==========================================
// 对齐: load_log 表；仅当子表存在被丢弃列时生成
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadLogEntry {
    pub file_name: String,
    pub sheet_name: String,
    pub table_index: usize,
    pub discarded_columns: Vec<String>,
}

impl LoadLogEntry {
    pub fn discarded_count(&self) -> usize {
        self.discarded_columns.len()
    }

    /// 落库文本形式（逗号+空格分隔）
    pub fn discarded_columns_text(&self) -> String {
        self.discarded_columns.join(", ")
    }
}

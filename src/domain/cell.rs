// ==========================================
// 计件工资表归一化 - 单元格原始值
// ==========================================
// 职责: 屏蔽表格读取库的单元格类型，供 CellCoercer 统一转换
// ==========================================

/// 单元格原始值（读取库无关）
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
    /// 日期时间（Excel 序列号，1899-12-30 为 0）
    DateTime(f64),
    /// 公式错误值（如 `#VALUE!`）
    Error(String),
}

impl From<&calamine::Data> for CellValue {
    fn from(data: &calamine::Data) -> Self {
        use calamine::Data;

        match data {
            Data::Empty => CellValue::Empty,
            Data::Int(v) => CellValue::Int(*v),
            Data::Float(v) => CellValue::Float(*v),
            Data::Bool(v) => CellValue::Bool(*v),
            Data::String(s) => CellValue::Text(s.clone()),
            Data::DateTime(dt) => CellValue::DateTime(dt.as_f64()),
            Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
            Data::Error(e) => CellValue::Error(e.to_string()),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<f64> for CellValue {
    fn from(v: f64) -> Self {
        CellValue::Float(v)
    }
}

impl From<Option<f64>> for CellValue {
    fn from(v: Option<f64>) -> Self {
        v.map(CellValue::Float).unwrap_or(CellValue::Empty)
    }
}

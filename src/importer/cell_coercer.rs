// ==========================================
// 计件工资表归一化 - 单元格转换 (CellCoercer)
// ==========================================
// 职责: 任意单元格 → 规范字符串
// 规则: 空/NaN → ""；整数值浮点去掉 ".0"；布尔按数值 1/0
// 红线: 不返回错误，任何输入都有字符串结果
// ==========================================

use crate::domain::CellValue;
use chrono::{Duration, NaiveDate};

/// 将单元格转为规范字符串
pub fn coerce(cell: &CellValue) -> String {
    match cell {
        CellValue::Empty => String::new(),
        CellValue::Int(v) => v.to_string(),
        CellValue::Float(v) => coerce_float(*v),
        CellValue::Bool(b) => if *b { "1" } else { "0" }.to_string(),
        CellValue::Text(s) => s.clone(),
        CellValue::DateTime(serial) => {
            excel_serial_to_text(*serial).unwrap_or_else(|| coerce_float(*serial))
        }
        CellValue::Error(e) => e.clone(),
    }
}

/// 转换一整行
pub fn coerce_row<'a, I: IntoIterator<Item = &'a CellValue>>(cells: I) -> Vec<String> {
    cells.into_iter().map(coerce).collect()
}

fn coerce_float(v: f64) -> String {
    if v.is_nan() {
        return String::new();
    }
    if v.is_finite() && v == v.trunc() && v.abs() < i64::MAX as f64 {
        return (v as i64).to_string();
    }
    v.to_string()
}

/// Excel 日期序列号 → `YYYY-mm-dd HH:MM:SS`
fn excel_serial_to_text(serial: f64) -> Option<String> {
    if !serial.is_finite() {
        return None;
    }
    let base = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let seconds = (serial * 86_400.0).round() as i64;
    let dt = base.checked_add_signed(Duration::seconds(seconds))?;
    Some(dt.format("%Y-%m-%d %H:%M:%S").to_string())
}

// ==========================================
// 计件工资表归一化 - 定点小数工具
// ==========================================
// 职责: 文本 → Decimal（不经过二进制浮点）；两位小数四舍五入
// 规则: 中点远离零舍入（ROUND_HALF_UP 语义），结果固定两位小数
// ==========================================

use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

/// 解析数值文本
///
/// - 去除首尾空白
/// - 全角数字/符号转半角
/// - 去除千分位逗号
/// - 支持科学计数法
///
/// 无法解析（含空串）返回 None
pub fn parse_decimal(text: &str) -> Option<Decimal> {
    let normalized: String = text
        .trim()
        .chars()
        .filter_map(|c| match c {
            '０'..='９' => char::from_u32(c as u32 - '０' as u32 + '0' as u32),
            '．' => Some('.'),
            '－' => Some('-'),
            '＋' => Some('+'),
            ',' | '，' => None,
            _ => Some(c),
        })
        .collect();

    let s = normalized.strip_prefix('+').unwrap_or(&normalized);
    if s.is_empty() {
        return None;
    }

    Decimal::from_str(s).ok().or_else(|| {
        if s.contains(['e', 'E']) {
            Decimal::from_scientific(s).ok()
        } else {
            None
        }
    })
}

/// 四舍五入到两位小数（中点远离零），并固定两位小数位
pub fn round_half_up_2(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}

/// 两位小数的 0
pub fn zero_2() -> Decimal {
    Decimal::new(0, 2)
}

/// 减半后按两位小数舍入
pub fn halve(value: Decimal) -> Decimal {
    round_half_up_2(value / Decimal::from(2))
}

/// 解析并舍入；无法解析时取 0.00
pub fn decimal_or_zero(text: &str) -> Decimal {
    parse_decimal(text).map(round_half_up_2).unwrap_or_else(zero_2)
}

/// 日期列文本规范化
///
/// 去掉一个小数点后全为数字、且数值为整数的，输出整数形式（`45000.0` → `45000`）；
/// 其余保持原样
pub fn normalize_date_text(value: &str) -> String {
    if value.is_empty() {
        return String::new();
    }
    let without_point = value.replacen('.', "", 1);
    if without_point.is_empty() || !without_point.chars().all(|c| c.is_ascii_digit()) {
        return value.to_string();
    }

    let parsed = Decimal::from_str(value)
        .ok()
        .or_else(|| Decimal::from_str(value.trim_end_matches('.')).ok());
    match parsed {
        Some(d) if d.fract().is_zero() => d.trunc().normalize().to_string(),
        _ => value.to_string(),
    }
}

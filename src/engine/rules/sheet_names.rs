// ==========================================
// 计件工资表归一化 - 工作表名规范化
// ==========================================
// 历年工作表名（含年份前缀、空格差异）→ 规范名
// ==========================================

const SHEET_NAME_MAPPINGS: [(&str, &str); 6] = [
    ("14年6月精加工", "精加工"),
    ("14年6月装配 喷漆", "装配喷漆"),
    ("14年6月绕嵌排", "绕嵌排"),
    ("装配 喷漆", "装配喷漆"),
    ("喷漆装配", "装配喷漆"),
    ("金加工", "精加工"),
];

/// 返回规范工作表名；无映射时返回 None
pub fn canonical_sheet_name(sheet_name: &str) -> Option<&'static str> {
    SHEET_NAME_MAPPINGS
        .iter()
        .find(|(from, _)| *from == sheet_name)
        .map(|(_, to)| *to)
}

/// 去除所有空格后的工作表名（规则匹配用）
pub fn compact_sheet_name(sheet_name: &str) -> String {
    sheet_name.chars().filter(|c| *c != ' ').collect()
}

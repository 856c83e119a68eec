// ==========================================
// 计件工资表归一化 - 类型投影 (TypedProjector)
// ==========================================
// 职责: 子表 → 规范记录 + 丢弃列日志
// 规则:
// - 列名去除全部空白、去掉占位列（空名/纯数字/`_n` 后缀/`_` 加数字）
//   规则引擎入口已先执行一次，重复执行无副作用
// - 其余非规范列记入 load_log；真正的未知列额外转储内容
// - 去掉出处列后没有任何规范列 → NoValidColumns
// - 数值字段: 无法解析取 0，两位小数四舍五入
// ==========================================

use crate::domain::{
    CanonicalField, CanonicalRecord, FieldKind, LoadLogEntry, LoadOutcome, Table,
};
use crate::engine::decimal::{decimal_or_zero, normalize_date_text, parse_decimal};
use crate::engine::error::ProjectionError;
use crate::repository::PayrollSink;
use tracing::{info, warn};

/// 投影结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projection {
    pub records: Vec<CanonicalRecord>,
    pub load_log: Option<LoadLogEntry>,
}

/// 占位列判定
///
/// 去重后缀、空列名、数字列名都来自前序步骤，不是真实数据列
pub fn is_placeholder_artifact(label: &str) -> bool {
    if label.is_empty() || label.chars().all(|c| c.is_ascii_digit()) {
        return true;
    }
    if let Some(rest) = label.strip_prefix('_') {
        if !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit()) {
            return true;
        }
    }
    has_dedup_suffix(label)
}

fn has_dedup_suffix(label: &str) -> bool {
    (1..100).any(|n| label.ends_with(&format!("_{}", n)))
}

fn strip_whitespace(label: &str) -> String {
    label.chars().filter(|c| !c.is_whitespace()).collect()
}

/// 列名清理: 去除全部空白后移除占位列，返回被移除的列名
pub fn clean_column_labels(table: &mut Table) -> Vec<String> {
    table.set_column_labels(strip_whitespace);

    let removed: Vec<String> = table
        .columns()
        .iter()
        .filter(|c| is_placeholder_artifact(c))
        .cloned()
        .collect();
    if !removed.is_empty() {
        table.retain_columns(|c| !is_placeholder_artifact(c));
    }
    removed
}

/// 投影一个子表
pub fn project(
    mut table: Table,
    file_name: &str,
    sheet_name: &str,
    table_index: usize,
) -> Result<Projection, ProjectionError> {
    let removed = clean_column_labels(&mut table);
    if !removed.is_empty() {
        info!(file = %file_name, sheet = %sheet_name, table_index, ?removed, "移除占位列");
    }

    let discarded: Vec<String> = table
        .columns()
        .iter()
        .filter(|c| CanonicalField::from_label(c).is_none())
        .cloned()
        .collect();

    let load_log = if discarded.is_empty() {
        None
    } else {
        let entry = LoadLogEntry {
            file_name: file_name.to_string(),
            sheet_name: sheet_name.to_string(),
            table_index,
            discarded_columns: discarded,
        };
        warn!(
            file = %file_name,
            sheet = %sheet_name,
            table_index,
            "{} 列被丢弃: {}",
            entry.discarded_count(),
            entry.discarded_columns_text()
        );
        dump_genuine_columns(&table, &entry);
        Some(entry)
    };

    let has_data_column = table
        .columns()
        .iter()
        .filter_map(|c| CanonicalField::from_label(c))
        .any(|f| !f.is_provenance());
    if !has_data_column {
        return Err(ProjectionError::NoValidColumns {
            file: file_name.to_string(),
            sheet: sheet_name.to_string(),
            table_index,
            load_log,
        });
    }

    let positions: Vec<Option<usize>> = CanonicalField::ALL
        .iter()
        .map(|f| table.column_index(f.label()))
        .collect();

    let records = table
        .rows()
        .iter()
        .enumerate()
        .map(|(row_idx, row)| {
            // 按规范字段顺序取值，缺失列为空串
            let cells: Vec<&str> = positions
                .iter()
                .map(|p| p.map(|i| row[i].as_str()).unwrap_or(""))
                .collect();
            let cell = |field: CanonicalField| cells[field as usize];
            let provenance = |field: CanonicalField, fallback: &str| match positions[field as usize] {
                Some(_) => cell(field).to_string(),
                None => fallback.to_string(),
            };
            let text = |field: CanonicalField| bounded(cell(field), field);
            let number = |field: CanonicalField| {
                let raw = cell(field);
                if !raw.trim().is_empty() && parse_decimal(raw).is_none() {
                    warn!(
                        file = %file_name,
                        sheet = %sheet_name,
                        table_index,
                        row = row_idx,
                        column = field.label(),
                        value = %raw,
                        "数值无法解析，使用 0"
                    );
                }
                decimal_or_zero(raw)
            };

            CanonicalRecord {
                file_name: provenance(CanonicalField::FileName, file_name),
                sheet_name: provenance(CanonicalField::SheetName, sheet_name),
                employee_full_name: text(CanonicalField::EmployeeFullName),
                date: normalize_date_text(&text(CanonicalField::Date)),
                customer_name: text(CanonicalField::CustomerName),
                model: text(CanonicalField::Model),
                process_full_name: text(CanonicalField::ProcessFullName),
                process: text(CanonicalField::Process),
                piece_count: number(CanonicalField::PieceCount),
                coefficient: number(CanonicalField::Coefficient),
                quota: number(CanonicalField::Quota),
                amount: number(CanonicalField::Amount),
                remark: text(CanonicalField::Remark),
                code: text(CanonicalField::Code),
            }
        })
        .collect();

    Ok(Projection { records, load_log })
}

/// 超长文本只告警，不截断（长度约束交给表定义）
fn bounded(value: &str, field: CanonicalField) -> String {
    if let FieldKind::Text(max) | FieldKind::DateText(max) = field.kind() {
        let len = value.chars().count();
        if len > max {
            warn!(column = field.label(), len, max, value = %value, "文本超出列宽");
        }
    }
    value.to_string()
}

fn dump_genuine_columns(table: &Table, entry: &LoadLogEntry) {
    let genuine: Vec<&String> = entry
        .discarded_columns
        .iter()
        .filter(|c| !is_placeholder_artifact(c))
        .collect();
    if genuine.is_empty() {
        return;
    }

    warn!(
        file = %entry.file_name,
        sheet = %entry.sheet_name,
        table_index = entry.table_index,
        ?genuine,
        "发现未知的命名列，需人工核对"
    );
    info!("子表内容:\n{}", table);
    for label in genuine {
        if let Some(idx) = table.column_index(label) {
            let values: Vec<&str> = table.column_values(idx).collect();
            info!("丢弃列 '{}' 的内容: {:?}", label, values);
        }
    }
}

/// 投影并写入 sink，返回子表结果
///
/// 丢弃列日志先于记录写入；NoValidColumns 时仍写入已生成的日志
pub fn load_into<S: PayrollSink + ?Sized>(
    sink: &S,
    table: Table,
    file_name: &str,
    sheet_name: &str,
    table_index: usize,
) -> LoadOutcome {
    let projection = match project(table, file_name, sheet_name, table_index) {
        Ok(p) => p,
        Err(ProjectionError::NoValidColumns {
            file,
            sheet,
            table_index,
            load_log,
        }) => {
            if let Some(entry) = &load_log {
                if let Err(e) = sink.append_load_log(entry) {
                    warn!(error = %e, "load_log 写入失败");
                }
            }
            let err = ProjectionError::NoValidColumns {
                file,
                sheet,
                table_index,
                load_log,
            };
            warn!("{}", err);
            return LoadOutcome::Failed {
                reason: err.to_string(),
            };
        }
        Err(e) => {
            return LoadOutcome::Failed {
                reason: e.to_string(),
            }
        }
    };

    if let Some(entry) = &projection.load_log {
        if let Err(e) = sink.append_load_log(entry) {
            return LoadOutcome::Failed {
                reason: ProjectionError::from(e).to_string(),
            };
        }
    }

    match sink.append_records(&projection.records) {
        Ok(rows) => {
            info!(
                file = %file_name,
                sheet = %sheet_name,
                table_index,
                rows,
                "子表写入成功"
            );
            LoadOutcome::Loaded { rows }
        }
        Err(e) => {
            let reason = ProjectionError::from(e).to_string();
            warn!(file = %file_name, sheet = %sheet_name, table_index, "{}", reason);
            LoadOutcome::Failed { reason }
        }
    }
}

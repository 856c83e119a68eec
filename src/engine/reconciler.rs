// ==========================================
// 计件工资表归一化 - 表头校正 (SchemaReconciler)
// ==========================================
// 职责: 判断子表表头是否可用；不可用时在数据行中寻找更好的表头
// 规则:
// - 表头命中期望列数 >= min_match → 原样接受
// - 否则逐行统计命中数，取最高者（并列取最早出现）
// - 最佳行命中数 > 原表头命中数 且 >= min_match → 提升为表头，
//   其后的行作为数据（其前及其本身丢弃）
// - 否则整表丢弃并记录内容
// ==========================================

use crate::config::ExpectedColumnSet;
use crate::domain::Table;
use crate::importer::grid_assembler::dedup_labels;
use tracing::{info, warn};

/// 子表来源，用于诊断日志
///
/// block 为切分顺序中的位置（从 1 开始），被丢弃的子表也占一个位置
#[derive(Debug, Clone, Copy)]
pub struct BlockOrigin<'a> {
    pub file_name: &'a str,
    pub sheet_name: &'a str,
    pub block: usize,
}

/// 表头校正结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconciled {
    /// 原表头可用
    Accepted(Table),
    /// 数据行被提升为表头
    Promoted { table: Table, header_row: usize },
    /// 无可用表头，整表丢弃
    Discarded { found_count: usize, best_score: usize },
}

impl Reconciled {
    pub fn into_table(self) -> Option<Table> {
        match self {
            Reconciled::Accepted(t) | Reconciled::Promoted { table: t, .. } => Some(t),
            Reconciled::Discarded { .. } => None,
        }
    }
}

/// 校正子表表头
pub fn reconcile(
    table: Table,
    expected: &ExpectedColumnSet,
    origin: BlockOrigin<'_>,
) -> Reconciled {
    let found_count = table
        .columns()
        .iter()
        .filter(|c| expected.contains(c))
        .count();

    if found_count >= expected.min_match() {
        return Reconciled::Accepted(table);
    }

    warn!(
        file = %origin.file_name,
        sheet = %origin.sheet_name,
        block = origin.block,
        found_count,
        min_match = expected.min_match(),
        "子表表头命中期望列不足，逐行查找更合适的表头"
    );

    let mut best: Option<(usize, usize)> = None;
    for (idx, row) in table.rows().iter().enumerate() {
        let score = expected.count_matches(row.iter().map(String::as_str));
        // 严格大于: 并列时保留最早的行
        if score > best.map(|(_, s)| s).unwrap_or(0) {
            best = Some((idx, score));
        }
    }

    match best {
        Some((header_row, score)) if score > found_count && score >= expected.min_match() => {
            info!(
                file = %origin.file_name,
                sheet = %origin.sheet_name,
                block = origin.block,
                header_row,
                score,
                "找到更合适的表头行"
            );
            let (_, mut rows) = table.into_parts();
            let data = rows.split_off(header_row + 1);
            let header = rows
                .pop()
                .unwrap_or_default()
                .into_iter()
                .map(|v| v.trim().to_string());
            Reconciled::Promoted {
                table: Table::new(dedup_labels(header), data),
                header_row,
            }
        }
        _ => {
            let best_score = best.map(|(_, s)| s).unwrap_or(0);
            warn!(
                file = %origin.file_name,
                sheet = %origin.sheet_name,
                block = origin.block,
                min_match = expected.min_match(),
                best_score,
                "没有命中足够期望列的行，丢弃子表"
            );
            warn!(
                file = %origin.file_name,
                sheet = %origin.sheet_name,
                block = origin.block,
                "丢弃的子表内容:\n{}",
                table
            );
            Reconciled::Discarded {
                found_count,
                best_score,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    fn s(v: &[&str]) -> Vec<String> {
        v.iter().map(|x| x.to_string()).collect()
    }

    fn expected() -> ExpectedColumnSet {
        ExpectedColumnSet::default()
    }

    fn origin() -> BlockOrigin<'static> {
        BlockOrigin {
            file_name: "a.xlsx",
            sheet_name: "精加工",
            block: 1,
        }
    }

    #[test]
    fn test_adequate_header_is_accepted() {
        let t = Table::new(
            s(&["职员全名", "型号", "计件数量", "金额"]),
            vec![s(&["张三", "X1", "1", "2"])],
        );
        assert_eq!(reconcile(t.clone(), &expected(), origin()), Reconciled::Accepted(t));
    }

    #[test]
    fn test_header_promotion_from_row_three() {
        let t = Table::new(
            s(&["2023年6月工资表", "", "", ""]),
            vec![
                s(&["制表: 张三", "", "", ""]),
                s(&["", "", "", ""]),
                s(&["部门: 精加工", "", "", ""]),
                s(&["职员全名", " 型号 ", "计件数量", "金额"]),
                s(&["李四", "X1", "10", "20"]),
                s(&["王五", "X2", "3", "6"]),
            ],
        );
        match reconcile(t, &expected(), origin()) {
            Reconciled::Promoted { table, header_row } => {
                assert_eq!(header_row, 3);
                assert_eq!(table.columns(), &s(&["职员全名", "型号", "计件数量", "金额"])[..]);
                assert_eq!(table.height(), 2);
                assert_eq!(table.rows()[0], s(&["李四", "X1", "10", "20"]));
            }
            other => panic!("expected promotion, got {:?}", other),
        }
    }

    #[test]
    fn test_tie_prefers_first_row() {
        let t = Table::new(
            s(&["a", "b", "c", "d"]),
            vec![
                s(&["型号", "金额", "定额", "系数"]),
                s(&["职员全名", "日期", "工序", "备注"]),
                s(&["x", "y", "z", "w"]),
            ],
        );
        match reconcile(t, &expected(), origin()) {
            Reconciled::Promoted { table, header_row } => {
                assert_eq!(header_row, 0);
                assert_eq!(table.height(), 2);
            }
            other => panic!("expected promotion, got {:?}", other),
        }
    }

    #[test]
    fn test_no_adequate_row_discards() {
        let t = Table::new(
            s(&["型号", "金额", "x"]),
            vec![s(&["型号", "金额", "定额"]), s(&["X1", "1", "2"])],
        );
        assert_eq!(
            reconcile(t, &expected(), origin()),
            Reconciled::Discarded {
                found_count: 2,
                best_score: 3
            }
        );
    }

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_discard_dump_carries_block_origin() {
        let buf = SharedBuf::default();
        let writer = buf.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_max_level(tracing::Level::WARN)
            .with_writer(move || writer.clone())
            .finish();

        let t = Table::new(s(&["2023年6月工资表"]), vec![s(&["制表: 张三"])]);
        let origin = BlockOrigin {
            file_name: "b.xlsx",
            sheet_name: "装配喷漆",
            block: 3,
        };
        let result = tracing::subscriber::with_default(subscriber, || {
            reconcile(t, &expected(), origin)
        });
        assert!(matches!(result, Reconciled::Discarded { .. }));

        let out = String::from_utf8(buf.0.lock().unwrap().clone()).unwrap();
        // 内容多行输出，字段附在事件末尾
        let start = out.find("丢弃的子表内容").expect("dump event");
        let dump = &out[start..];
        assert!(dump.contains("file=b.xlsx"), "{}", dump);
        assert!(dump.contains("sheet=装配喷漆"), "{}", dump);
        assert!(dump.contains("block=3"), "{}", dump);
    }

    #[test]
    fn test_promotion_requires_improvement() {
        // 阈值为 1 时单列表头即可接受
        let set = ExpectedColumnSet::new(vec!["型号".to_string()], 1);
        let t = Table::new(s(&["型号"]), vec![s(&["X1"])]);
        assert!(matches!(reconcile(t, &set, origin()), Reconciled::Accepted(_)));
    }
}

// ==========================================
// PipelineDriver 端到端测试
// ==========================================
// 测试目标: 内存工作表 → 切分/校正/规则/投影 → SQLite
// ==========================================

mod test_helpers;

use payroll_normalizer::engine::PipelineError;
use payroll_normalizer::importer::ImportError;
use payroll_normalizer::logging;
use test_helpers::{build_pipeline, fetch_records, rows, test_config, MemorySheetReader};

#[test]
fn test_two_block_sheet_split_and_defaults() {
    logging::init_test();

    let reader = MemorySheetReader::new().with_sheet(
        "2023年6月.xlsx",
        "精加工",
        rows(&[
            &["职员全名", "计件数量", "金额"],
            &["前装", "10", "20.00"],
            &["", "", ""],
            &["型号", "", ""],
            &["X1", "", ""],
        ]),
    );
    let mut config = test_config();
    config.min_match = 1;
    let mut p = build_pipeline(reader, config);

    let summary = p.driver.run_full_batch().unwrap();
    assert_eq!(summary.sheets_seen, 1);
    assert_eq!(summary.sub_tables, 2);
    assert_eq!(summary.successful_loads, 2);
    assert_eq!(summary.failed_loads, 0);
    assert_eq!(summary.records_written, 3);

    let records = fetch_records(&p.repo);
    assert_eq!(records.len(), 3);
    assert_eq!(records[0].0, "黄志梅");
    assert_eq!(records[1].0, "陈会清");
    for r in &records[..2] {
        assert_eq!(r.2, 5.0);
        assert_eq!(r.3, 10.0);
        assert_eq!(r.4, "精加工");
    }
    assert_eq!(records[2].0, "");
    assert_eq!(records[2].1, "X1");
    assert_eq!(records[2].2, 0.0);
    assert_eq!(records[2].3, 0.0);

    // 占位列（空名、去重后缀）不计入 load_log
    assert_eq!(p.repo.count_load_log().unwrap(), 0);

    let logs = p.rule_log.descriptions();
    assert!(logs.contains(&"将'前装'记录拆分为2行: 黄志梅 和 陈会清 共1次".to_string()));
}

#[test]
fn test_unexpected_column_goes_to_load_log() {
    let reader = MemorySheetReader::new().with_sheet(
        "a.xlsx",
        "精加工",
        rows(&[
            &["职员全名", "型号", "计件数量", "金额", "备用1"],
            &["张三", "X1", "2", "4.5", "备"],
        ]),
    );
    let mut p = build_pipeline(reader, test_config());
    let summary = p.driver.run_full_batch().unwrap();
    assert_eq!(summary.successful_loads, 1);

    let (file, sheet, idx, cols, num): (String, String, i64, String, i64) = p
        .repo
        .with_connection(|conn| {
            conn.query_row(
                "SELECT file_name, sheet_name, table_index, discarded_columns, discarded_cols_num \
                 FROM load_log",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?)),
            )
        })
        .unwrap();
    assert_eq!(file, "a.xlsx");
    assert_eq!(sheet, "精加工");
    assert_eq!(idx, 1);
    assert_eq!(cols, "备用1");
    assert_eq!(num, 1);

    let records = fetch_records(&p.repo);
    assert_eq!(records[0].3, 4.5);
}

#[test]
fn test_no_valid_columns_is_counted_as_failure() {
    let reader = MemorySheetReader::new().with_sheet(
        "a.xlsx",
        "精加工",
        rows(&[&["备注2"], &["x"], &["y"]]),
    );
    let mut config = test_config();
    config.expected_columns = vec!["备注2".to_string()];
    config.min_match = 1;
    let mut p = build_pipeline(reader, config);

    let summary = p.driver.run_full_batch().unwrap();
    assert_eq!(summary.sub_tables, 1);
    assert_eq!(summary.successful_loads, 0);
    assert_eq!(summary.failed_loads, 1);
    assert_eq!(p.repo.count_records().unwrap(), 0);
    assert_eq!(p.repo.count_load_log().unwrap(), 1);
}

#[test]
fn test_header_promotion_and_discard() {
    let reader = MemorySheetReader::new().with_sheet(
        "a.xlsx",
        "绕嵌排",
        rows(&[
            &["2023年6月绕嵌排工资", "", "", "", ""],
            &["制表人: 王五", "", "", "", ""],
            &["职员全名", "型号", "嵌线", "计件数量", "金额"],
            &["李四", "Y2", "嵌线A", "3", "9"],
            &["", "", "", "", ""],
            &["合计", "", "", "", "9"],
        ]),
    );
    let mut p = build_pipeline(reader, test_config());

    let summary = p.driver.run_full_batch().unwrap();
    assert_eq!(summary.sub_tables, 2);
    assert_eq!(summary.sub_tables_discarded, 1);
    assert_eq!(summary.successful_loads, 1);

    let records = fetch_records(&p.repo);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].0, "李四");
    assert_eq!(records[0].1, "Y2");

    let process: String = p
        .repo
        .with_connection(|conn| {
            conn.query_row("SELECT process_full_name FROM payroll_details", [], |r| r.get(0))
        })
        .unwrap();
    assert_eq!(process, "嵌线A");
}

#[test]
fn test_skipped_and_failed_sheets_do_not_abort() {
    let reader = MemorySheetReader::new()
        .with_sheet("a.xlsx", "6月汇总", rows(&[&["x"], &["1"]]))
        .with_sheet("a.xlsx", "统计表", rows(&[&["x"], &["1"]]))
        .with_sheet("a.xlsx", "deleted", rows(&[&["x"], &["1"]]))
        .with_broken_sheet("a.xlsx", "坏表", "单元格解析失败")
        .with_sheet(
            "a.xlsx",
            "金加工",
            rows(&[
                &["职员全名", "型号", "计件数量", "金额"],
                &["张三", "X1", "1", "2"],
            ]),
        )
        .with_broken_file("b.xlsx", "not a zip");
    let mut p = build_pipeline(reader, test_config());

    let summary = p.driver.run_full_batch().unwrap();
    assert_eq!(summary.files, 2);
    assert_eq!(summary.files_failed, 1);
    assert_eq!(summary.sheets_skipped, 3);
    assert_eq!(summary.sheets_failed, 1);
    assert_eq!(summary.sheets_seen, 1);
    assert_eq!(summary.successful_loads, 1);

    let records = fetch_records(&p.repo);
    assert_eq!(records[0].4, "精加工");
    assert!(p
        .rule_log
        .descriptions()
        .contains(&"工作表名称映射: '金加工' -> '精加工'".to_string()));
}

#[test]
fn test_full_batch_resets_and_single_file_accumulates() {
    let reader = MemorySheetReader::new().with_sheet(
        "a.xlsx",
        "精加工",
        rows(&[
            &["职员全名", "型号", "计件数量", "金额"],
            &["张三", "X1", "1", "2"],
            &["李四", "X2", "1", "2"],
        ]),
    );
    let mut p = build_pipeline(reader, test_config());

    p.driver.run_full_batch().unwrap();
    let summary = p.driver.run_full_batch().unwrap();
    assert_eq!(summary.files, 1);
    assert_eq!(p.repo.count_records().unwrap(), 2);

    let summary = p.driver.run_single_file("a.xlsx").unwrap();
    assert_eq!(summary.files, 2);
    assert_eq!(summary.records_written, 4);
    assert_eq!(p.repo.count_records().unwrap(), 4);
}

#[test]
fn test_single_file_not_found() {
    let reader = MemorySheetReader::new().with_sheet("a.xlsx", "s", rows(&[&["x"]]));
    let mut p = build_pipeline(reader, test_config());

    match p.driver.run_single_file("missing.xlsx") {
        Err(PipelineError::Import(ImportError::FileNotFound { file, .. })) => {
            assert_eq!(file, "missing.xlsx");
        }
        other => panic!("expected FileNotFound, got {:?}", other.map(|_| ())),
    }
    assert_eq!(p.driver.summary().files, 0);
}

#[test]
fn test_empty_file_list() {
    let mut p = build_pipeline(MemorySheetReader::new(), test_config());
    assert!(matches!(
        p.driver.run_full_batch(),
        Err(PipelineError::NoInputFiles)
    ));
    assert_eq!(p.repo.count_records().unwrap(), 0);
}

#[test]
fn test_blank_row_runs_collapse() {
    let reader = MemorySheetReader::new().with_sheet(
        "a.xlsx",
        "精加工",
        rows(&[
            &["职员全名", "型号", "计件数量", "金额"],
            &["张三", "X1", "1", "2"],
            &["", "", "", ""],
            &["", "", "", ""],
            &["", "", "", ""],
            &["职员全名", "型号", "计件数量", "金额"],
            &["李四", "X2", "1", "2"],
            &[""],
        ]),
    );
    let mut p = build_pipeline(reader, test_config());
    let summary = p.driver.run_full_batch().unwrap();
    assert_eq!(summary.sub_tables, 2);
    assert_eq!(summary.records_written, 2);
}

#[test]
fn test_discarded_title_block_does_not_consume_table_index() {
    let reader = MemorySheetReader::new().with_sheet(
        "a.xlsx",
        "精加工",
        rows(&[
            &["2023年6月精加工工资表", "", "", "", ""],
            &["", "", "", "", ""],
            &["职员全名", "型号", "计件数量", "金额", "备用1"],
            &["张三", "X1", "2", "4", "备"],
        ]),
    );
    let mut p = build_pipeline(reader, test_config());

    let summary = p.driver.run_full_batch().unwrap();
    assert_eq!(summary.sub_tables, 2);
    assert_eq!(summary.sub_tables_discarded, 1);
    assert_eq!(summary.successful_loads, 1);

    let idx: i64 = p
        .repo
        .with_connection(|conn| conn.query_row("SELECT table_index FROM load_log", [], |r| r.get(0)))
        .unwrap();
    assert_eq!(idx, 1);
}

#[test]
fn test_header_cleanup_runs_before_rules() {
    let reader = MemorySheetReader::new()
        .with_sheet(
            "a.xlsx",
            "精加工",
            rows(&[
                &["", "姓名", "型号", "计件数量", "金额"],
                &["1", "张三", "X1", "2", "4"],
            ]),
        )
        .with_sheet(
            "a.xlsx",
            "金加工",
            rows(&[
                &["职员全名", "型号", "定额", "合 计"],
                &["李四", "X2", "2", "4"],
            ]),
        );
    let mut config = test_config();
    config.min_match = 2;
    let mut p = build_pipeline(reader, config);

    let summary = p.driver.run_full_batch().unwrap();
    assert_eq!(summary.successful_loads, 2);
    assert_eq!(p.repo.count_load_log().unwrap(), 0);

    let records = fetch_records(&p.repo);
    assert_eq!(records[0].0, "张三");
    assert_eq!(records[0].3, 4.0);
    assert_eq!(records[1].0, "李四");
    assert_eq!(records[1].3, 4.0);
}

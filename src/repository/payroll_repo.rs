// ==========================================
// 计件工资表归一化 - 工资明细 Repository
// ==========================================
// 职责: payroll_details / load_log 两张表的建表与追加写入
// 红线: Repository 不含业务规则，只追加，不更新
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::{CanonicalField, CanonicalRecord, LoadLogEntry};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, params_from_iter, Connection};
use std::sync::{Arc, Mutex};

pub const PAYROLL_TABLE: &str = "payroll_details";
pub const LOAD_LOG_TABLE: &str = "load_log";

// ==========================================
// PayrollSink Trait
// ==========================================
// 用途: 规范记录的追加式落库接口
// 实现者: SqlitePayrollRepository
pub trait PayrollSink {
    /// 建表（幂等）
    fn ensure_tables(&self) -> RepositoryResult<()>;

    /// 追加规范记录（按给定顺序），返回写入行数
    fn append_records(&self, records: &[CanonicalRecord]) -> RepositoryResult<usize>;

    /// 追加一条丢弃列日志
    fn append_load_log(&self, entry: &LoadLogEntry) -> RepositoryResult<()>;

    /// 清空两张表（全量重跑前的维护操作）
    fn truncate_all(&self) -> RepositoryResult<()>;
}

// ==========================================
// SqlitePayrollRepository
// ==========================================
pub struct SqlitePayrollRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SqlitePayrollRepository {
    /// 创建新的 Repository 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(format!("{}: {}", db_path, e)))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    fn lock(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    pub fn count_records(&self) -> RepositoryResult<usize> {
        let conn = self.lock()?;
        let n: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", PAYROLL_TABLE),
            [],
            |row| row.get(0),
        )?;
        Ok(n as usize)
    }

    pub fn count_load_log(&self) -> RepositoryResult<usize> {
        let conn = self.lock()?;
        let n: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", LOAD_LOG_TABLE),
            [],
            |row| row.get(0),
        )?;
        Ok(n as usize)
    }

    /// 执行任意只读查询的回调（测试/核对用）
    pub fn with_connection<T, F>(&self, f: F) -> RepositoryResult<T>
    where
        F: FnOnce(&Connection) -> rusqlite::Result<T>,
    {
        let conn = self.lock()?;
        Ok(f(&conn)?)
    }
}

fn create_payroll_table_sql() -> String {
    let columns: Vec<String> = CanonicalField::ALL
        .iter()
        .map(|f| format!("{} {}", f.column_name(), f.sql_type()))
        .collect();
    format!(
        "CREATE TABLE IF NOT EXISTS {} (\n    {}\n)",
        PAYROLL_TABLE,
        columns.join(",\n    ")
    )
}

fn insert_payroll_sql() -> String {
    let names: Vec<&str> = CanonicalField::ALL.iter().map(|f| f.column_name()).collect();
    let placeholders: Vec<String> = (1..=names.len()).map(|i| format!("?{}", i)).collect();
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        PAYROLL_TABLE,
        names.join(", "),
        placeholders.join(", ")
    )
}

impl PayrollSink for SqlitePayrollRepository {
    fn ensure_tables(&self) -> RepositoryResult<()> {
        let conn = self.lock()?;
        conn.execute(&create_payroll_table_sql(), [])?;
        conn.execute(
            &format!(
                r#"
                CREATE TABLE IF NOT EXISTS {} (
                    file_name CHAR(50),
                    sheet_name CHAR(50),
                    table_index INT,
                    discarded_columns CHAR(200),
                    discarded_cols_num INT
                )
                "#,
                LOAD_LOG_TABLE
            ),
            [],
        )?;
        Ok(())
    }

    fn append_records(&self, records: &[CanonicalRecord]) -> RepositoryResult<usize> {
        if records.is_empty() {
            return Ok(0);
        }
        let conn = self.lock()?;
        let tx = conn
            .unchecked_transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        let mut count = 0;
        {
            let mut stmt = tx.prepare(&insert_payroll_sql())?;
            for record in records {
                // 数值字段以两位小数文本写入，由 NUMERIC 亲和性转换
                let values = CanonicalField::ALL.iter().map(|f| record.value_text(*f));
                stmt.execute(params_from_iter(values))?;
                count += 1;
            }
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(count)
    }

    fn append_load_log(&self, entry: &LoadLogEntry) -> RepositoryResult<()> {
        let conn = self.lock()?;
        conn.execute(
            &format!(
                "INSERT INTO {} (file_name, sheet_name, table_index, discarded_columns, discarded_cols_num) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                LOAD_LOG_TABLE
            ),
            params![
                entry.file_name,
                entry.sheet_name,
                entry.table_index as i64,
                entry.discarded_columns_text(),
                entry.discarded_count() as i64,
            ],
        )?;
        Ok(())
    }

    fn truncate_all(&self) -> RepositoryResult<()> {
        let conn = self.lock()?;
        conn.execute_batch(&format!(
            "DELETE FROM {}; DELETE FROM {};",
            PAYROLL_TABLE, LOAD_LOG_TABLE
        ))?;
        Ok(())
    }
}

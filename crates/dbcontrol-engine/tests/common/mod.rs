#![allow(dead_code)]

use dbcontrol_core::handle::{ExecError, ExecutionHandle, Row, SqlValue};
use dbcontrol_core::model::{ChangeOperation, Changelog, Column, CreateTable};
use dbcontrol_store::SqliteHandle;
use rusqlite::params;

/// Wraps an in-memory SQLite handle, records every executed statement and
/// fails any statement containing `fail_on`.
pub struct RecordingHandle {
    pub inner: SqliteHandle,
    pub executed: Vec<String>,
    pub fail_on: Option<String>,
}

impl RecordingHandle {
    pub fn new() -> Self {
        Self {
            inner: SqliteHandle::open_in_memory().expect("in-memory database"),
            executed: Vec::new(),
            fail_on: None,
        }
    }

    pub fn failing_on(mut self, pattern: &str) -> Self {
        self.fail_on = Some(pattern.to_string());
        self
    }

    /// Changelog DDL executed so far (ledger statements excluded)
    pub fn ddl_executions(&self) -> Vec<&str> {
        self.executed
            .iter()
            .map(String::as_str)
            .filter(|sql| sql.starts_with("CREATE TABLE ") && !sql.contains("database_changelog"))
            .collect()
    }

    pub fn ledger_ids(&self) -> Vec<String> {
        let mut stmt = self
            .inner
            .connection()
            .prepare("SELECT id FROM database_changelog ORDER BY id")
            .unwrap();
        let ids = stmt
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<Vec<String>, _>>()
            .unwrap();
        ids
    }

    /// `false` while a transaction is left open on the connection
    pub fn is_autocommit(&self) -> bool {
        self.inner.connection().is_autocommit()
    }

    pub fn table_exists(&self, name: &str) -> bool {
        self.inner
            .connection()
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
                params![name],
                |row| row.get::<_, i64>(0),
            )
            .unwrap()
            == 1
    }
}

impl ExecutionHandle for RecordingHandle {
    fn execute(&mut self, sql: &str, params: &[SqlValue]) -> Result<usize, ExecError> {
        self.executed.push(sql.to_string());
        if let Some(pattern) = &self.fail_on {
            if sql.contains(pattern.as_str()) {
                return Err(ExecError::new(format!("injected failure on {}", pattern)));
            }
        }
        self.inner.execute(sql, params)
    }

    fn query(&mut self, sql: &str, params: &[SqlValue]) -> Result<Vec<Row>, ExecError> {
        self.inner.query(sql, params)
    }
}

pub fn create_table(id: &str, table: &str) -> Changelog {
    Changelog::new(
        id,
        ChangeOperation::CreateTable(
            CreateTable::new(table)
                .column(Column::new("id", "INT").not_null())
                .column(Column::new("name", "VARCHAR(255)").default_value("anon"))
                .primary_key("id"),
        ),
    )
    .with_description(format!("create {}", table))
    .with_author("tests")
}

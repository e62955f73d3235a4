//! `ExecutionHandle` over a rusqlite connection

use crate::errors::Result;
use dbcontrol_core::handle::{ExecError, ExecutionHandle, Row, SqlValue};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};
use std::path::Path;

/// SQLite execution handle
///
/// Owns one connection. Statements run in autocommit mode unless the caller
/// brackets them with `begin`/`commit`.
pub struct SqliteHandle {
    conn: Connection,
}

impl SqliteHandle {
    /// Wrap an already opened connection
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    /// Open and configure a database file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = crate::db::open(path)?;
        crate::db::configure(&conn)?;
        Ok(Self::new(conn))
    }

    /// Open and configure a database file that must already exist
    pub fn open_existing<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = crate::db::open_existing(path)?;
        crate::db::configure(&conn)?;
        Ok(Self::new(conn))
    }

    /// Open and configure an in-memory database
    pub fn open_in_memory() -> Result<Self> {
        let conn = crate::db::open_in_memory()?;
        crate::db::configure(&conn)?;
        Ok(Self::new(conn))
    }

    /// Borrow the underlying connection
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Give back the underlying connection
    pub fn into_inner(self) -> Connection {
        self.conn
    }
}

fn exec_error(err: rusqlite::Error) -> ExecError {
    ExecError::new(err.to_string())
}

fn to_sqlite(value: &SqlValue) -> Value {
    match value {
        SqlValue::Null => Value::Null,
        SqlValue::Integer(i) => Value::Integer(*i),
        SqlValue::Text(s) => Value::Text(s.clone()),
    }
}

fn from_sqlite(value: Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Integer(i) => SqlValue::Integer(i),
        Value::Real(f) => SqlValue::Text(f.to_string()),
        Value::Text(s) => SqlValue::Text(s),
        Value::Blob(b) => SqlValue::Text(String::from_utf8_lossy(&b).into_owned()),
    }
}

impl ExecutionHandle for SqliteHandle {
    fn execute(
        &mut self,
        sql: &str,
        params: &[SqlValue],
    ) -> std::result::Result<usize, ExecError> {
        tracing::debug!(sql, "sqlite execute");
        let bound: Vec<Value> = params.iter().map(to_sqlite).collect();
        self.conn
            .execute(sql, params_from_iter(bound.iter()))
            .map_err(exec_error)
    }

    fn query(
        &mut self,
        sql: &str,
        params: &[SqlValue],
    ) -> std::result::Result<Vec<Row>, ExecError> {
        tracing::debug!(sql, "sqlite query");
        let bound: Vec<Value> = params.iter().map(to_sqlite).collect();
        let mut stmt = self.conn.prepare(sql).map_err(exec_error)?;
        let column_count = stmt.column_count();

        let rows = stmt
            .query_map(params_from_iter(bound.iter()), |row| {
                (0..column_count)
                    .map(|idx| row.get::<_, Value>(idx))
                    .collect::<rusqlite::Result<Vec<Value>>>()
            })
            .map_err(exec_error)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(exec_error)?;

        Ok(rows
            .into_iter()
            .map(|row| row.into_iter().map(from_sqlite).collect())
            .collect())
    }
}

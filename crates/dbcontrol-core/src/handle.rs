//! Execution handle abstraction
//!
//! The engine and the ledger never own a connection. Callers pass an
//! already-connected handle that knows how to run statements against one
//! database; the store crate ships a SQLite implementation.

use thiserror::Error;

/// A bound parameter or a column value read back from a query
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Integer(i64),
    Text(String),
}

impl SqlValue {
    /// Borrow the value as text, if it is text
    pub fn as_text(&self) -> Option<&str> {
        match self {
            SqlValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Consume the value into an owned string, if it is text
    pub fn into_text(self) -> Option<String> {
        match self {
            SqlValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::Text(value.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        SqlValue::Text(value)
    }
}

impl From<Option<String>> for SqlValue {
    fn from(value: Option<String>) -> Self {
        value.map_or(SqlValue::Null, SqlValue::Text)
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        SqlValue::Integer(value)
    }
}

/// One result row, columns in select order
pub type Row = Vec<SqlValue>;

/// Failure reported by the underlying database
///
/// Connection, syntax and permission failures all surface here with the
/// driver's message untouched.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message}")]
pub struct ExecError {
    message: String,
}

impl ExecError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Statement execution against a single connected database
pub trait ExecutionHandle {
    /// Execute a statement, returning the number of affected rows
    fn execute(&mut self, sql: &str, params: &[SqlValue]) -> Result<usize, ExecError>;

    /// Run a query and collect every row
    fn query(&mut self, sql: &str, params: &[SqlValue]) -> Result<Vec<Row>, ExecError>;

    fn begin(&mut self) -> Result<(), ExecError> {
        self.execute("BEGIN", &[]).map(|_| ())
    }

    fn commit(&mut self) -> Result<(), ExecError> {
        self.execute("COMMIT", &[]).map(|_| ())
    }

    fn rollback(&mut self) -> Result<(), ExecError> {
        self.execute("ROLLBACK", &[]).map(|_| ())
    }
}

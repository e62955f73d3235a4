//! Error handling for dbcontrol-store
//!
//! Wraps dbcontrol-core ExError with store-specific helpers

use dbcontrol_core::errors::{ExError, ExErrorKind};
use dbcontrol_core::handle::ExecError;
use std::path::Path;

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

/// Create a ledger read/write error
pub fn ledger_error(op: &str, err: ExecError) -> ExError {
    ExError::new(ExErrorKind::Ledger)
        .with_op(op.to_string())
        .with_message(err.message())
}

/// Create a ledger error for a row that could not be decoded
pub fn ledger_corrupt(changelog_id: &str, reason: &str) -> ExError {
    ExError::new(ExErrorKind::Ledger)
        .with_op("ledger_decode")
        .with_changelog_id(changelog_id)
        .with_message(reason.to_string())
}

/// Create a changelog loading error
pub fn load_error(path: &Path, reason: &str) -> ExError {
    ExError::new(ExErrorKind::InvalidInput)
        .with_op("load_changelog")
        .with_message(format!("{}: {}", path.display(), reason))
}

/// Create a JSON decoding error
pub fn serialization_error(path: &Path, err: serde_json::Error) -> ExError {
    ExError::new(ExErrorKind::Serialization)
        .with_op("load_changelog")
        .with_message(format!("{}: {}", path.display(), err))
}

/// Create a database error from rusqlite::Error
pub fn from_rusqlite(err: rusqlite::Error) -> ExError {
    ExError::new(ExErrorKind::Execution)
        .with_op("sqlite")
        .with_message(err.to_string())
}

/// Create an IO error for a file that could not be read
pub fn io_error(path: &Path, err: std::io::Error) -> ExError {
    ExError::new(ExErrorKind::Io)
        .with_op("read_file")
        .with_message(format!("{}: {}", path.display(), err))
}

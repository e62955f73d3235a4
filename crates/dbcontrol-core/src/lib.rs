//! dbcontrol Core - changelog model and DDL synthesis
//!
//! This crate provides the dialect-independent pieces of the migration
//! engine:
//! - Changelog model (create-table operations, columns, ledger entries)
//! - DDL synthesis from a structured change description
//! - MD5 fingerprinting of synthesized statements
//! - The `ExecutionHandle` abstraction the engine and ledger talk through
//! - Error facility and structured logging facility

pub mod checksum;
pub mod ddl;
pub mod errors;
pub mod handle;
pub mod logging_facility;
pub mod model;

// Macros reference schema constants through this path so callers do not
// need a direct dependency on the types crate.
pub use dbcontrol_core_types as core_types;

// Re-export commonly used types
pub use checksum::compute_checksum;
pub use ddl::synthesize;
pub use errors::{DbControlError, ExError, ExErrorKind, Result};
pub use handle::{ExecError, ExecutionHandle, Row, SqlValue};
pub use model::{AlterTable, ChangeOperation, Changelog, Column, CreateTable, LedgerEntry};

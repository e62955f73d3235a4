//! dbcontrol Store - Persistence layer
//!
//! Provides:
//! - SQLite connection management and an `ExecutionHandle` over rusqlite
//! - The changelog ledger (`database_changelog` table)
//! - Changelog loading from a JSON index of changelog files

pub mod db;
pub mod errors;
pub mod ledger;
pub mod loader;
pub mod sqlite_handle;

// Re-export key types
pub use errors::Result;
pub use ledger::LedgerRecord;
pub use sqlite_handle::SqliteHandle;

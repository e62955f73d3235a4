//! dbcontrol Engine - Migration orchestration
//!
//! Coordinates DDL synthesis, fingerprinting and the changelog ledger to
//! apply each changelog exactly once and detect drift in ones already
//! applied.

pub mod migrate;

pub use migrate::{
    run_migrations, verify_changelogs, ChangelogOutcome, ChangelogResult, MigrationOptions,
    MigrationReport,
};

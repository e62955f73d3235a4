//! Migration runner with boundary logging.
//!
//! For each changelog, in input order: synthesize its statement, fingerprint
//! it, and consult the ledger.
//! - No ledger row: execute the statement, then record it.
//! - Row with the same fingerprint: already applied, nothing to do.
//! - Row with a different fingerprint: the changelog was edited after it was
//!   applied; the run fails with `ChecksumMismatch`.
//!
//! The first failure aborts the run. Changelogs before it stay applied and
//! recorded; the failing one and everything after it are untouched.
//!
//! ## Logging Ownership
//!
//! This module owns lifecycle logging for `migrate`, `verify` and each
//! `changelog_apply`. Store and core use only `tracing::debug!()`.

use dbcontrol_core::errors::{DbControlError, ExError};
use dbcontrol_core::handle::ExecutionHandle;
use dbcontrol_core::model::{Changelog, LedgerEntry};
use dbcontrol_core::{compute_checksum, synthesize};
use dbcontrol_core::{log_op_end, log_op_error, log_op_start};
use dbcontrol_core_types::schema::{OP_CHANGELOG_APPLY, OP_MIGRATE, OP_VERIFY};
use dbcontrol_core_types::RequestId;
use dbcontrol_store::errors::Result;
use dbcontrol_store::ledger;
use serde::Serialize;
use std::time::Instant;

/// Run-wide switches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MigrationOptions {
    /// Execute a changelog's statement and its ledger insert inside one
    /// transaction on the handle
    pub atomic_apply: bool,

    /// Synthesize and verify only; never execute or record
    pub dry_run: bool,
}

impl Default for MigrationOptions {
    fn default() -> Self {
        Self {
            atomic_apply: true,
            dry_run: false,
        }
    }
}

/// What happened to one changelog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangelogOutcome {
    /// Executed and recorded in this run
    Applied,
    /// Recorded earlier with the same fingerprint
    Matched,
    /// Not in the ledger; would be applied (dry run / verify only)
    Pending,
}

impl ChangelogOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangelogOutcome::Applied => "applied",
            ChangelogOutcome::Matched => "matched",
            ChangelogOutcome::Pending => "pending",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangelogResult {
    pub changelog_id: String,
    pub md5_sum: String,
    pub outcome: ChangelogOutcome,
}

/// Per-changelog outcomes of a successful run, in input order
#[derive(Debug, Clone, Serialize)]
pub struct MigrationReport {
    pub request_id: String,
    pub results: Vec<ChangelogResult>,
}

impl MigrationReport {
    fn count(&self, outcome: ChangelogOutcome) -> usize {
        self.results.iter().filter(|r| r.outcome == outcome).count()
    }

    pub fn applied_count(&self) -> usize {
        self.count(ChangelogOutcome::Applied)
    }

    pub fn matched_count(&self) -> usize {
        self.count(ChangelogOutcome::Matched)
    }

    pub fn pending_count(&self) -> usize {
        self.count(ChangelogOutcome::Pending)
    }
}

/// Apply changelogs in order, exactly once each
///
/// Creates the ledger table first if it does not exist.
///
/// ## Errors
///
/// - `InvalidOperation` / `UnsupportedOperation`: a changelog cannot be synthesized
/// - `Execution`: the database rejected a changelog's statement
/// - `ChecksumMismatch`: an applied changelog was edited afterwards
/// - `Ledger` / `DuplicateLedgerEntry`: the ledger could not be read or written
pub fn run_migrations(
    handle: &mut dyn ExecutionHandle,
    changelogs: &[Changelog],
    options: &MigrationOptions,
) -> Result<MigrationReport> {
    run(handle, changelogs, options, OP_MIGRATE)
}

/// Check every changelog against the ledger without applying anything
///
/// Reports `Matched` or `Pending` per changelog and fails on the first drift.
pub fn verify_changelogs(
    handle: &mut dyn ExecutionHandle,
    changelogs: &[Changelog],
) -> Result<MigrationReport> {
    let options = MigrationOptions {
        dry_run: true,
        ..MigrationOptions::default()
    };
    run(handle, changelogs, &options, OP_VERIFY)
}

fn run(
    handle: &mut dyn ExecutionHandle,
    changelogs: &[Changelog],
    options: &MigrationOptions,
    op: &'static str,
) -> Result<MigrationReport> {
    let request_id = RequestId::new();
    log_op_start!(
        op,
        request_id = request_id.as_str(),
        changelog_count = changelogs.len() as u64,
        dry_run = options.dry_run,
    );
    let start = Instant::now();

    let report = run_impl(handle, changelogs, options, &request_id).map_err(|e| {
        let e = e.with_request_id(request_id.clone());
        log_op_error!(
            op,
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64,
            request_id = request_id.as_str(),
            changelog_id = e.changelog_id().unwrap_or_default(),
        );
        e
    })?;

    log_op_end!(
        op,
        duration_ms = start.elapsed().as_millis() as u64,
        request_id = request_id.as_str(),
        applied_count = report.applied_count() as u64,
    );

    Ok(report)
}

fn run_impl(
    handle: &mut dyn ExecutionHandle,
    changelogs: &[Changelog],
    options: &MigrationOptions,
    request_id: &RequestId,
) -> Result<MigrationReport> {
    ledger::ensure_schema(handle)?;

    let mut results = Vec::with_capacity(changelogs.len());
    for changelog in changelogs {
        results.push(apply_changelog(handle, changelog, options)?);
    }

    Ok(MigrationReport {
        request_id: request_id.to_string(),
        results,
    })
}

fn apply_changelog(
    handle: &mut dyn ExecutionHandle,
    changelog: &Changelog,
    options: &MigrationOptions,
) -> Result<ChangelogResult> {
    log_op_start!(OP_CHANGELOG_APPLY, changelog_id = changelog.id.as_str());
    let start = Instant::now();

    let result = apply_changelog_impl(handle, changelog, options).map_err(|e| {
        log_op_error!(
            OP_CHANGELOG_APPLY,
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64,
            changelog_id = changelog.id.as_str(),
        );
        e
    })?;

    log_op_end!(
        OP_CHANGELOG_APPLY,
        duration_ms = start.elapsed().as_millis() as u64,
        changelog_id = changelog.id.as_str(),
        outcome = result.outcome.as_str(),
        checksum = result.md5_sum.as_str(),
    );

    Ok(result)
}

fn apply_changelog_impl(
    handle: &mut dyn ExecutionHandle,
    changelog: &Changelog,
    options: &MigrationOptions,
) -> Result<ChangelogResult> {
    let query = synthesize(changelog).map_err(ExError::from)?;
    let md5_sum = compute_checksum(&query);

    let outcome = if verify_changelog(handle, &changelog.id, &md5_sum)? {
        ChangelogOutcome::Matched
    } else if options.dry_run {
        ChangelogOutcome::Pending
    } else {
        execute_and_record(handle, changelog, &query, &md5_sum, options.atomic_apply)?;
        ChangelogOutcome::Applied
    };

    Ok(ChangelogResult {
        changelog_id: changelog.id.clone(),
        md5_sum,
        outcome,
    })
}

/// `Ok(true)` if already applied unchanged, `Ok(false)` if never applied
fn verify_changelog(
    handle: &mut dyn ExecutionHandle,
    changelog_id: &str,
    md5_sum: &str,
) -> Result<bool> {
    match ledger::lookup(handle, changelog_id)? {
        None => Ok(false),
        Some(record) if record.md5_sum == md5_sum => Ok(true),
        Some(record) => Err(DbControlError::ChecksumMismatch {
            changelog_id: changelog_id.to_string(),
            stored: record.md5_sum,
            computed: md5_sum.to_string(),
        }
        .into()),
    }
}

fn execute_and_record(
    handle: &mut dyn ExecutionHandle,
    changelog: &Changelog,
    query: &str,
    md5_sum: &str,
    atomic: bool,
) -> Result<()> {
    if !atomic {
        return execute_then_record(handle, changelog, query, md5_sum);
    }

    handle.begin().map_err(|e| {
        ExError::from(e)
            .with_op("begin")
            .with_changelog_id(changelog.id.as_str())
    })?;

    let result = execute_then_record(handle, changelog, query, md5_sum).and_then(|()| {
        handle.commit().map_err(|e| {
            ExError::from(e)
                .with_op("commit")
                .with_changelog_id(changelog.id.as_str())
        })
    });

    // A failed COMMIT can leave the transaction open on the handle
    if result.is_err() {
        rollback(handle, changelog);
    }
    result
}

fn rollback(handle: &mut dyn ExecutionHandle, changelog: &Changelog) {
    if let Err(rollback_err) = handle.rollback() {
        tracing::error!(
            changelog_id = changelog.id.as_str(),
            error = rollback_err.message(),
            "rollback after failed apply also failed"
        );
    }
}

fn execute_then_record(
    handle: &mut dyn ExecutionHandle,
    changelog: &Changelog,
    query: &str,
    md5_sum: &str,
) -> Result<()> {
    handle.execute(query, &[]).map_err(|e| {
        ExError::from(e)
            .with_op("execute_changelog")
            .with_changelog_id(changelog.id.as_str())
            .with_statement(query)
    })?;
    tracing::debug!(changelog_id = changelog.id.as_str(), "changelog statement executed");

    let entry = LedgerEntry::new(
        changelog.id.as_str(),
        changelog.description.clone(),
        md5_sum,
        query,
    );
    ledger::record(handle, &entry)
}

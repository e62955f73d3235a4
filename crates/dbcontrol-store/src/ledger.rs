//! Changelog ledger
//!
//! The `database_changelog` table records, per changelog id, the exact
//! statement that was executed, its fingerprint and when it ran. Rows are
//! insert-only: nothing in this crate updates or deletes them.
//!
//! The column layout is shared with existing deployments and must not change.

use crate::errors::{ledger_corrupt, ledger_error, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use dbcontrol_core::errors::{DbControlError, ExError};
use dbcontrol_core::handle::{ExecutionHandle, Row, SqlValue};
use dbcontrol_core::model::LedgerEntry;

/// Name of the ledger table
pub const LEDGER_TABLE: &str = "database_changelog";

const CREATE_LEDGER_SQL: &str = "CREATE TABLE IF NOT EXISTS database_changelog (\
     id varchar(255) primary key, \
     description text, \
     execution_time datetime(3) NOT NULL, \
     md5_sum varchar(32) NOT NULL, \
     query_log text NOT NULL\
     )";

const EXECUTION_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f";

/// Fingerprint and statement stored for one changelog
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerRecord {
    pub md5_sum: String,
    pub query_log: String,
}

/// Create the ledger table if it does not exist
pub fn ensure_schema(handle: &mut dyn ExecutionHandle) -> Result<()> {
    handle
        .execute(CREATE_LEDGER_SQL, &[])
        .map_err(|e| ledger_error("ledger_ensure_schema", e))?;
    Ok(())
}

/// Look up the ledger row for a changelog id
pub fn lookup(
    handle: &mut dyn ExecutionHandle,
    changelog_id: &str,
) -> Result<Option<LedgerRecord>> {
    let rows = handle
        .query(
            "SELECT md5_sum, query_log FROM database_changelog WHERE id = ?1",
            &[SqlValue::from(changelog_id)],
        )
        .map_err(|e| ledger_error("ledger_lookup", e).with_changelog_id(changelog_id))?;

    let Some(row) = rows.into_iter().next() else {
        return Ok(None);
    };

    let mut columns = row.into_iter();
    let md5_sum = text_column(changelog_id, columns.next(), "md5_sum")?;
    let query_log = text_column(changelog_id, columns.next(), "query_log")?;

    Ok(Some(LedgerRecord { md5_sum, query_log }))
}

/// Insert a ledger row
///
/// ## Errors
///
/// - `DuplicateLedgerEntry`: a row for this id already exists
/// - `Ledger`: the insert failed
pub fn record(handle: &mut dyn ExecutionHandle, entry: &LedgerEntry) -> Result<()> {
    if lookup(handle, &entry.id)?.is_some() {
        return Err(ExError::from(DbControlError::DuplicateLedgerEntry {
            changelog_id: entry.id.clone(),
        }));
    }

    let execution_time = entry.execution_time.format(EXECUTION_TIME_FORMAT).to_string();
    handle
        .execute(
            "INSERT INTO database_changelog (id, description, query_log, md5_sum, execution_time) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
            &[
                SqlValue::from(entry.id.as_str()),
                SqlValue::from(entry.description.clone()),
                SqlValue::from(entry.query_log.as_str()),
                SqlValue::from(entry.md5_sum.as_str()),
                SqlValue::from(execution_time),
            ],
        )
        .map_err(|e| ledger_error("ledger_record", e).with_changelog_id(entry.id.as_str()))?;

    tracing::debug!(changelog_id = %entry.id, md5_sum = %entry.md5_sum, "ledger row recorded");
    Ok(())
}

/// All ledger rows, oldest first
pub fn entries(handle: &mut dyn ExecutionHandle) -> Result<Vec<LedgerEntry>> {
    let rows = handle
        .query(
            "SELECT id, description, md5_sum, query_log, execution_time \
             FROM database_changelog ORDER BY execution_time, id",
            &[],
        )
        .map_err(|e| ledger_error("ledger_entries", e))?;

    rows.into_iter().map(decode_entry).collect()
}

fn decode_entry(row: Row) -> Result<LedgerEntry> {
    let mut columns = row.into_iter();
    let id = text_column("<unknown>", columns.next(), "id")?;
    let description = match columns.next() {
        Some(SqlValue::Text(s)) => Some(s),
        Some(SqlValue::Null) | None => None,
        Some(other) => {
            return Err(ledger_corrupt(
                &id,
                &format!("description has unexpected value {:?}", other),
            ))
        }
    };
    let md5_sum = text_column(&id, columns.next(), "md5_sum")?;
    let query_log = text_column(&id, columns.next(), "query_log")?;
    let raw_time = text_column(&id, columns.next(), "execution_time")?;
    let execution_time = parse_execution_time(&id, &raw_time)?;

    Ok(LedgerEntry {
        id,
        description,
        md5_sum,
        query_log,
        execution_time,
    })
}

fn text_column(changelog_id: &str, value: Option<SqlValue>, column: &str) -> Result<String> {
    value
        .and_then(SqlValue::into_text)
        .ok_or_else(|| ledger_corrupt(changelog_id, &format!("column {} is not text", column)))
}

fn parse_execution_time(changelog_id: &str, raw: &str) -> Result<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .map(|naive| naive.and_utc())
        .map_err(|e| {
            ledger_corrupt(
                changelog_id,
                &format!("execution_time {:?} is not a timestamp: {}", raw, e),
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite_handle::SqliteHandle;
    use chrono::TimeZone;
    use dbcontrol_core::errors::ExErrorKind;

    fn setup() -> SqliteHandle {
        let mut handle = SqliteHandle::open_in_memory().unwrap();
        ensure_schema(&mut handle).unwrap();
        handle
    }

    #[test]
    fn test_ensure_schema_is_idempotent() {
        let mut handle = setup();
        ensure_schema(&mut handle).unwrap();
        ensure_schema(&mut handle).unwrap();
    }

    #[test]
    fn test_lookup_absent() {
        let mut handle = setup();
        assert_eq!(lookup(&mut handle, "nope").unwrap(), None);
    }

    #[test]
    fn test_record_then_lookup() {
        let mut handle = setup();
        let entry = LedgerEntry::new(
            "001",
            Some("users".to_string()),
            "abc",
            "CREATE TABLE a (x INT, PRIMARY KEY (x))",
        );
        record(&mut handle, &entry).unwrap();

        let found = lookup(&mut handle, "001").unwrap().unwrap();
        assert_eq!(found.md5_sum, "abc");
        assert_eq!(found.query_log, entry.query_log);
    }

    #[test]
    fn test_second_record_is_rejected() {
        let mut handle = setup();
        let entry = LedgerEntry::new("001", None, "abc", "q1");
        record(&mut handle, &entry).unwrap();

        let err = record(&mut handle, &LedgerEntry::new("001", None, "def", "q2")).unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::DuplicateLedgerEntry);

        // The original row is untouched
        let found = lookup(&mut handle, "001").unwrap().unwrap();
        assert_eq!(found.md5_sum, "abc");
    }

    #[test]
    fn test_entries_round_trip_timestamp_to_millis() {
        let mut handle = setup();
        let ts = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        record(&mut handle, &LedgerEntry::new("001", None, "abc", "q").at(ts)).unwrap();

        let all = entries(&mut handle).unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].execution_time, ts);
        assert_eq!(all[0].description, None);
    }

    #[test]
    fn test_entries_ordered_by_execution_time() {
        let mut handle = setup();
        let early = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let late = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        record(&mut handle, &LedgerEntry::new("b", None, "1", "q").at(late)).unwrap();
        record(&mut handle, &LedgerEntry::new("a", None, "2", "q").at(early)).unwrap();

        let ids: Vec<_> = entries(&mut handle)
            .unwrap()
            .into_iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_lookup_without_schema_is_ledger_error() {
        let mut handle = SqliteHandle::open_in_memory().unwrap();
        let err = lookup(&mut handle, "001").unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::Ledger);
        assert_eq!(err.changelog_id(), Some("001"));
    }

    #[test]
    fn test_parse_legacy_space_separator() {
        let parsed = parse_execution_time("001", "2024-01-02 03:04:05.678").unwrap();
        assert_eq!(parsed.timestamp_subsec_millis(), 678);
    }
}

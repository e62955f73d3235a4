//! Changelog loading
//!
//! Reads an index file listing changelog files and aggregates their
//! changelogs in index order, then file order. No sorting is applied: the
//! order returned is the order the engine applies them in.

pub mod format;

use crate::errors::{io_error, load_error, serialization_error, Result};
use dbcontrol_core::errors::{DbControlError, ExError};
use dbcontrol_core::model::Changelog;
use format::{ChangelogFileEntry, ChangelogIndex};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Load every changelog listed by an index file
///
/// Relative paths in the index resolve against the index file's directory.
///
/// ## Errors
///
/// - `Io`: the index or a listed file cannot be read
/// - `Serialization`: a file is not valid JSON for its format
/// - `InvalidInput`: duplicate changelog ids, or a changelog with two operations
pub fn load_all_changelogs(index_path: &Path) -> Result<Vec<Changelog>> {
    let content = fs::read_to_string(index_path).map_err(|e| io_error(index_path, e))?;
    let index: ChangelogIndex =
        serde_json::from_str(&content).map_err(|e| serialization_error(index_path, e))?;

    let base = index_path.parent().unwrap_or_else(|| Path::new("."));
    let mut changelogs = Vec::new();
    for listed in &index {
        let path = resolve(base, listed);
        changelogs.extend(load_changelog_file(&path)?);
    }

    check_unique_ids(&changelogs)?;

    tracing::debug!(
        index = %index_path.display(),
        files = index.len(),
        changelogs = changelogs.len(),
        "changelogs loaded"
    );
    Ok(changelogs)
}

/// Load the changelogs of a single file, in file order
pub fn load_changelog_file(path: &Path) -> Result<Vec<Changelog>> {
    let content = fs::read_to_string(path).map_err(|e| io_error(path, e))?;
    let entries: Vec<ChangelogFileEntry> =
        serde_json::from_str(&content).map_err(|e| serialization_error(path, e))?;

    entries
        .into_iter()
        .map(|entry| {
            let id = entry.id.clone();
            entry
                .into_changelog()
                .map_err(|e| load_error(path, &e.to_string()).with_changelog_id(id))
        })
        .collect()
}

/// Parse changelogs from a JSON string
pub fn parse_changelogs_str(content: &str) -> Result<Vec<Changelog>> {
    let entries: Vec<ChangelogFileEntry> = serde_json::from_str(content)
        .map_err(|e| serialization_error(Path::new("<inline>"), e))?;

    let changelogs = entries
        .into_iter()
        .map(|entry| entry.into_changelog().map_err(ExError::from))
        .collect::<Result<Vec<_>>>()?;

    check_unique_ids(&changelogs)?;
    Ok(changelogs)
}

fn resolve(base: &Path, listed: &str) -> PathBuf {
    let path = Path::new(listed);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

fn check_unique_ids(changelogs: &[Changelog]) -> Result<()> {
    let mut seen = HashSet::new();
    for changelog in changelogs {
        if !seen.insert(changelog.id.as_str()) {
            return Err(DbControlError::DuplicateChangelogId {
                changelog_id: changelog.id.clone(),
            }
            .into());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dbcontrol_core::errors::ExErrorKind;
    use dbcontrol_core::model::ChangeOperation;

    #[test]
    fn test_parse_create_table() {
        let json = r#"[{
            "id": "001",
            "description": "users",
            "author": "dba",
            "createTable": {
                "tableName": "users",
                "columns": [
                    {"columnName": "id", "columnType": "INT", "nonNullable": true, "defaultValue": ""},
                    {"columnName": "name", "columnType": "VARCHAR(255)", "defaultValue": "anon"}
                ],
                "primaryKeys": ["id"]
            }
        }]"#;

        let changelogs = parse_changelogs_str(json).unwrap();
        assert_eq!(changelogs.len(), 1);

        let Some(ChangeOperation::CreateTable(create)) = &changelogs[0].operation else {
            panic!("expected create table");
        };
        assert_eq!(create.table_name, "users");
        assert!(create.columns[0].non_nullable);
        assert_eq!(create.columns[0].default_value, None);
        assert_eq!(create.columns[1].default_value.as_deref(), Some("anon"));
        assert_eq!(create.primary_keys, vec!["id"]);
    }

    #[test]
    fn test_missing_operation_is_kept_as_none() {
        let changelogs = parse_changelogs_str(r#"[{"id": "001"}]"#).unwrap();
        assert!(changelogs[0].operation.is_none());
    }

    #[test]
    fn test_alter_table_parses() {
        let changelogs =
            parse_changelogs_str(r#"[{"id": "001", "alterTable": {"tableName": "users"}}]"#)
                .unwrap();
        assert!(matches!(
            changelogs[0].operation,
            Some(ChangeOperation::AlterTable(_))
        ));
    }

    #[test]
    fn test_two_operations_rejected() {
        let json = r#"[{
            "id": "001",
            "createTable": {"tableName": "t", "columns": [], "primaryKeys": []},
            "alterTable": {"tableName": "t"}
        }]"#;
        let err = parse_changelogs_str(json).unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::InvalidInput);
        assert_eq!(err.changelog_id(), Some("001"));
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let json = r#"[{"id": "001"}, {"id": "001"}]"#;
        let err = parse_changelogs_str(json).unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::InvalidInput);
    }

    #[test]
    fn test_malformed_json_is_serialization_error() {
        let err = parse_changelogs_str("[{").unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::Serialization);
    }

    #[test]
    fn test_resolve_relative_and_absolute() {
        let base = Path::new("/srv/changelog");
        assert_eq!(
            resolve(base, "001.json"),
            PathBuf::from("/srv/changelog/001.json")
        );
        assert_eq!(resolve(base, "/abs/x.json"), PathBuf::from("/abs/x.json"));
    }
}

//! DDL synthesis
//!
//! Turns a changelog's structured operation into exactly one statement.
//!
//! Identifiers and type strings are emitted verbatim: DDL cannot be
//! parameter-bound, so changelog files must be trusted input. Default
//! literals are single-quoted with embedded quotes doubled.

use crate::errors::{DbControlError, Result};
use crate::model::{ChangeOperation, Changelog, Column, CreateTable};

/// Synthesize the statement for a changelog
///
/// ## Errors
///
/// - `MissingOperation`: the changelog has no operation body
/// - `InvalidCreateTable`: the create-table is structurally incomplete
/// - `UnsupportedOperation`: the operation kind has no synthesizer
pub fn synthesize(changelog: &Changelog) -> Result<String> {
    let operation = changelog
        .operation
        .as_ref()
        .ok_or_else(|| DbControlError::MissingOperation {
            changelog_id: changelog.id.clone(),
        })?;

    match operation {
        ChangeOperation::CreateTable(create) => create_table_sql(&changelog.id, create),
        ChangeOperation::AlterTable(_) => Err(DbControlError::UnsupportedOperation {
            changelog_id: changelog.id.clone(),
            operation: operation.kind().to_string(),
        }),
    }
}

/// Render a create-table operation
///
/// `CREATE TABLE <table> (<col>, ..., PRIMARY KEY (<pk>, ...))`
pub fn create_table_sql(changelog_id: &str, create: &CreateTable) -> Result<String> {
    validate_create_table(changelog_id, create)?;

    let mut clauses: Vec<String> = create.columns.iter().map(column_clause).collect();
    clauses.push(format!("PRIMARY KEY ({})", create.primary_keys.join(", ")));

    Ok(format!(
        "CREATE TABLE {} ({})",
        create.table_name,
        clauses.join(", ")
    ))
}

fn column_clause(column: &Column) -> String {
    let mut clause = format!("{} {}", column.name, column.column_type);
    if column.non_nullable {
        clause.push_str(" NOT NULL");
    }
    if let Some(value) = column.effective_default() {
        clause.push_str(" DEFAULT ");
        clause.push_str(&quote_literal(value));
    }
    clause
}

fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

fn validate_create_table(changelog_id: &str, create: &CreateTable) -> Result<()> {
    let invalid = |reason: String| DbControlError::InvalidCreateTable {
        changelog_id: changelog_id.to_string(),
        reason,
    };

    if create.table_name.trim().is_empty() {
        return Err(invalid("table name is empty".to_string()));
    }
    if create.columns.is_empty() {
        return Err(invalid(format!("table {} has no columns", create.table_name)));
    }
    for (idx, column) in create.columns.iter().enumerate() {
        if column.name.trim().is_empty() {
            return Err(invalid(format!("column {} has an empty name", idx)));
        }
        if column.column_type.trim().is_empty() {
            return Err(invalid(format!("column {} has an empty type", column.name)));
        }
    }
    if create.primary_keys.is_empty() {
        return Err(invalid(format!(
            "table {} declares no primary key",
            create.table_name
        )));
    }
    if let Some(pk) = create.primary_keys.iter().find(|pk| pk.trim().is_empty()) {
        return Err(invalid(format!("primary key name {:?} is empty", pk)));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AlterTable;

    fn users() -> CreateTable {
        CreateTable::new("users")
            .column(Column::new("id", "INT").not_null().default_value(""))
            .column(Column::new("name", "VARCHAR(255)").default_value("anon"))
            .primary_key("id")
    }

    #[test]
    fn test_users_table() {
        let sql = create_table_sql("001", &users()).unwrap();
        assert_eq!(
            sql,
            "CREATE TABLE users (id INT NOT NULL, name VARCHAR(255) DEFAULT 'anon', PRIMARY KEY (id))"
        );
    }

    #[test]
    fn test_column_order_follows_input() {
        let create = CreateTable::new("t")
            .column(Column::new("b", "TEXT"))
            .column(Column::new("a", "TEXT"))
            .primary_key("b")
            .primary_key("a");
        let sql = create_table_sql("001", &create).unwrap();

        let b = sql.find("b TEXT").unwrap();
        let a = sql.find("a TEXT").unwrap();
        assert!(b < a);
        assert!(sql.ends_with("PRIMARY KEY (b, a))"));
    }

    #[test]
    fn test_not_null_with_default() {
        let create = CreateTable::new("t")
            .column(Column::new("flag", "INT").not_null().default_value("0"))
            .primary_key("flag");
        let sql = create_table_sql("001", &create).unwrap();
        assert!(sql.contains("flag INT NOT NULL DEFAULT '0'"));
    }

    #[test]
    fn test_default_quotes_are_doubled() {
        let create = CreateTable::new("t")
            .column(Column::new("s", "TEXT").default_value("it's"))
            .primary_key("s");
        let sql = create_table_sql("001", &create).unwrap();
        assert!(sql.contains("DEFAULT 'it''s'"));
    }

    #[test]
    fn test_no_trailing_semicolon() {
        let sql = create_table_sql("001", &users()).unwrap();
        assert!(!sql.ends_with(';'));
    }

    #[test]
    fn test_missing_operation_is_invalid() {
        let changelog = Changelog {
            id: "001".to_string(),
            description: None,
            author: None,
            operation: None,
        };
        let err = synthesize(&changelog).unwrap_err();
        assert_eq!(
            err,
            DbControlError::MissingOperation {
                changelog_id: "001".to_string()
            }
        );
    }

    #[test]
    fn test_alter_table_is_unsupported() {
        let changelog = Changelog::new(
            "002",
            ChangeOperation::AlterTable(AlterTable {
                table_name: "users".to_string(),
            }),
        );
        let err = synthesize(&changelog).unwrap_err();
        assert!(matches!(
            err,
            DbControlError::UnsupportedOperation { ref operation, .. } if operation == "alterTable"
        ));
    }

    #[test]
    fn test_empty_table_name_is_invalid() {
        let create = CreateTable::new(" ")
            .column(Column::new("a", "INT"))
            .primary_key("a");
        assert!(matches!(
            create_table_sql("001", &create),
            Err(DbControlError::InvalidCreateTable { .. })
        ));
    }

    #[test]
    fn test_no_columns_is_invalid() {
        let create = CreateTable::new("t").primary_key("a");
        assert!(matches!(
            create_table_sql("001", &create),
            Err(DbControlError::InvalidCreateTable { .. })
        ));
    }

    #[test]
    fn test_missing_primary_key_is_invalid() {
        let create = CreateTable::new("t").column(Column::new("a", "INT"));
        let err = create_table_sql("009", &create).unwrap_err();
        assert!(err.to_string().contains("009"));
    }

    #[test]
    fn test_empty_column_type_is_invalid() {
        let create = CreateTable::new("t")
            .column(Column::new("a", ""))
            .primary_key("a");
        assert!(create_table_sql("001", &create).is_err());
    }
}

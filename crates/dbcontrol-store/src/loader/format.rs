//! Changelog file format
//!
//! An index file is a JSON array of changelog file paths. Each changelog
//! file is a JSON array of changelog objects:
//!
//! ```json
//! [{
//!   "id": "001-create-users",
//!   "description": "users table",
//!   "author": "dba",
//!   "createTable": {
//!     "tableName": "users",
//!     "columns": [
//!       {"columnName": "id", "columnType": "INT", "nonNullable": true},
//!       {"columnName": "name", "columnType": "VARCHAR(255)", "defaultValue": "anon"}
//!     ],
//!     "primaryKeys": ["id"]
//!   }
//! }]
//! ```

use dbcontrol_core::errors::DbControlError;
use dbcontrol_core::model::{AlterTable, ChangeOperation, Changelog, Column, CreateTable};
use serde::{Deserialize, Serialize};

/// Index file: changelog file paths in application order
pub type ChangelogIndex = Vec<String>;

/// One changelog as written on disk
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangelogFileEntry {
    pub id: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub author: Option<String>,

    #[serde(default)]
    pub create_table: Option<CreateTableFile>,

    #[serde(default)]
    pub alter_table: Option<AlterTableFile>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTableFile {
    pub table_name: String,

    #[serde(default)]
    pub columns: Vec<ColumnFile>,

    #[serde(default)]
    pub primary_keys: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlterTableFile {
    pub table_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnFile {
    pub column_name: String,

    pub column_type: String,

    #[serde(default)]
    pub non_nullable: bool,

    #[serde(default)]
    pub default_value: Option<String>,
}

impl ChangelogFileEntry {
    /// Convert into the engine's model
    ///
    /// A missing operation is carried through as `None` and rejected at
    /// synthesis; declaring two operations is rejected here.
    pub fn into_changelog(self) -> Result<Changelog, DbControlError> {
        let operation = match (self.create_table, self.alter_table) {
            (Some(_), Some(_)) => {
                return Err(DbControlError::ConflictingOperations {
                    changelog_id: self.id,
                })
            }
            (Some(create), None) => Some(ChangeOperation::CreateTable(create.into())),
            (None, Some(alter)) => Some(ChangeOperation::AlterTable(AlterTable {
                table_name: alter.table_name,
            })),
            (None, None) => None,
        };

        Ok(Changelog {
            id: self.id,
            description: self.description,
            author: self.author,
            operation,
        })
    }
}

impl From<CreateTableFile> for CreateTable {
    fn from(file: CreateTableFile) -> Self {
        CreateTable {
            table_name: file.table_name,
            columns: file.columns.into_iter().map(Column::from).collect(),
            primary_keys: file.primary_keys,
        }
    }
}

impl From<ColumnFile> for Column {
    fn from(file: ColumnFile) -> Self {
        Column {
            name: file.column_name,
            column_type: file.column_type,
            non_nullable: file.non_nullable,
            default_value: file.default_value.filter(|v| !v.is_empty()),
        }
    }
}

use serde::{Deserialize, Serialize};

/// Changelog - one named, ordered schema-change unit
///
/// Changelogs are produced once by a loader and never mutated. The position
/// of a changelog in the input sequence is the order it is applied in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Changelog {
    /// Identifier, stable across runs; the ledger's primary key
    pub id: String,

    /// Free-form description, copied into the ledger
    pub description: Option<String>,

    /// Who wrote the changelog
    pub author: Option<String>,

    /// The change to apply. `None` models a changelog whose operation body
    /// was absent in its source file.
    pub operation: Option<ChangeOperation>,
}

impl Changelog {
    /// Create a changelog with no description or author
    pub fn new(id: impl Into<String>, operation: ChangeOperation) -> Self {
        Self {
            id: id.into(),
            description: None,
            author: None,
            operation: Some(operation),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }
}

/// The kinds of change a changelog can carry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChangeOperation {
    CreateTable(CreateTable),
    /// Parsed but not synthesized; rejected as unsupported.
    AlterTable(AlterTable),
}

impl ChangeOperation {
    /// Stable name of the operation kind, used in errors and logs
    pub fn kind(&self) -> &'static str {
        match self {
            ChangeOperation::CreateTable(_) => "createTable",
            ChangeOperation::AlterTable(_) => "alterTable",
        }
    }
}

/// Create-table operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateTable {
    pub table_name: String,

    /// Columns in declaration order
    pub columns: Vec<Column>,

    /// Primary-key column names in key order
    pub primary_keys: Vec<String>,
}

impl CreateTable {
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            columns: Vec::new(),
            primary_keys: Vec::new(),
        }
    }

    /// Append a column
    pub fn column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    /// Append a primary-key column name
    pub fn primary_key(mut self, name: impl Into<String>) -> Self {
        self.primary_keys.push(name.into());
        self
    }
}

/// Alter-table operation (not implemented beyond parsing)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlterTable {
    pub table_name: String,
}

/// Column definition within a create-table operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,

    /// Dialect-native type string, passed through verbatim
    pub column_type: String,

    pub non_nullable: bool,

    /// Default literal; `None` and `Some("")` both mean no default clause
    pub default_value: Option<String>,
}

impl Column {
    /// Create a nullable column with no default
    pub fn new(name: impl Into<String>, column_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            column_type: column_type.into(),
            non_nullable: false,
            default_value: None,
        }
    }

    pub fn not_null(mut self) -> Self {
        self.non_nullable = true;
        self
    }

    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    /// The default literal if one should be emitted
    pub fn effective_default(&self) -> Option<&str> {
        self.default_value.as_deref().filter(|v| !v.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_preserves_order() {
        let op = CreateTable::new("users")
            .column(Column::new("id", "INT").not_null())
            .column(Column::new("name", "VARCHAR(255)"))
            .primary_key("id")
            .primary_key("name");

        let names: Vec<_> = op.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["id", "name"]);
        assert_eq!(op.primary_keys, vec!["id", "name"]);
    }

    #[test]
    fn test_empty_default_is_no_default() {
        let col = Column::new("a", "INT").default_value("");
        assert_eq!(col.effective_default(), None);

        let col = Column::new("a", "INT").default_value("0");
        assert_eq!(col.effective_default(), Some("0"));
    }

    #[test]
    fn test_operation_kind_names() {
        let create = ChangeOperation::CreateTable(CreateTable::new("t"));
        let alter = ChangeOperation::AlterTable(AlterTable {
            table_name: "t".to_string(),
        });
        assert_eq!(create.kind(), "createTable");
        assert_eq!(alter.kind(), "alterTable");
    }

    #[test]
    fn test_changelog_builders() {
        let changelog = Changelog::new("001", ChangeOperation::CreateTable(CreateTable::new("t")))
            .with_description("create t")
            .with_author("ops");

        assert_eq!(changelog.description.as_deref(), Some("create t"));
        assert_eq!(changelog.author.as_deref(), Some("ops"));
        assert!(changelog.operation.is_some());
    }

    #[test]
    fn test_serde_round_trip_keeps_operation_tag() {
        let changelog = Changelog::new("001", ChangeOperation::CreateTable(CreateTable::new("t")));
        let json = serde_json::to_value(&changelog).unwrap();
        assert!(json["operation"].get("createTable").is_some());

        let back: Changelog = serde_json::from_value(json).unwrap();
        assert_eq!(back, changelog);
    }
}

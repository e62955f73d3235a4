use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One row of the changelog ledger
///
/// Written once, when a changelog is first applied, and never updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Changelog id (ledger primary key)
    pub id: String,

    /// Changelog description at the time it was applied
    pub description: Option<String>,

    /// Fingerprint of `query_log`
    pub md5_sum: String,

    /// Exact statement text that was executed
    pub query_log: String,

    /// When the statement was successfully executed
    pub execution_time: DateTime<Utc>,
}

impl LedgerEntry {
    /// Create an entry stamped with the current time
    pub fn new(
        id: impl Into<String>,
        description: Option<String>,
        md5_sum: impl Into<String>,
        query_log: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            description,
            md5_sum: md5_sum.into(),
            query_log: query_log.into(),
            execution_time: Utc::now(),
        }
    }

    /// Override the execution timestamp
    pub fn at(mut self, execution_time: DateTime<Utc>) -> Self {
        self.execution_time = execution_time;
        self
    }
}

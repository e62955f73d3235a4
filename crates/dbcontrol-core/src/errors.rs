use crate::handle::ExecError;
use dbcontrol_core_types::RequestId;
use thiserror::Error;

/// Result type alias using DbControlError
pub type Result<T> = std::result::Result<T, DbControlError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code that callers and tests can match
/// on without parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Synthesis
    InvalidOperation,
    UnsupportedOperation,

    // Input
    InvalidInput,

    // Execution / verification
    Execution,
    ChecksumMismatch,

    // Ledger
    Ledger,
    DuplicateLedgerEntry,

    // Integration/IO
    Io,
    Serialization,
    Config,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidOperation => "ERR_INVALID_OPERATION",
            ExErrorKind::UnsupportedOperation => "ERR_UNSUPPORTED_OPERATION",
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::Execution => "ERR_EXECUTION",
            ExErrorKind::ChecksumMismatch => "ERR_CHECKSUM_MISMATCH",
            ExErrorKind::Ledger => "ERR_LEDGER",
            ExErrorKind::DuplicateLedgerEntry => "ERR_DUPLICATE_LEDGER_ENTRY",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Config => "ERR_CONFIG",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error type
///
/// Carries a classification for programmatic handling plus the context a
/// caller needs to diagnose a failed run without re-running it: the
/// changelog id, the statement text, and for drift both fingerprints.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    changelog_id: Option<String>,
    statement: Option<String>,
    stored_checksum: Option<String>,
    computed_checksum: Option<String>,
    request_id: Option<RequestId>,
    message: String,
    source: Option<Box<ExError>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            changelog_id: None,
            statement: None,
            stored_checksum: None,
            computed_checksum: None,
            request_id: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add changelog ID context
    pub fn with_changelog_id(mut self, id: impl Into<String>) -> Self {
        self.changelog_id = Some(id.into());
        self
    }

    /// Add the statement text that was being executed
    pub fn with_statement(mut self, statement: impl Into<String>) -> Self {
        self.statement = Some(statement.into());
        self
    }

    /// Add the stored and freshly computed fingerprints
    pub fn with_checksums(mut self, stored: impl Into<String>, computed: impl Into<String>) -> Self {
        self.stored_checksum = Some(stored.into());
        self.computed_checksum = Some(computed.into());
        self
    }

    /// Add request ID context
    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = Some(request_id);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add source error
    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Get the operation context, if any
    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    /// Get the changelog ID context, if any
    pub fn changelog_id(&self) -> Option<&str> {
        self.changelog_id.as_deref()
    }

    /// Get the statement text, if any
    pub fn statement(&self) -> Option<&str> {
        self.statement.as_deref()
    }

    /// Get the fingerprint recorded in the ledger, if any
    pub fn stored_checksum(&self) -> Option<&str> {
        self.stored_checksum.as_deref()
    }

    /// Get the fingerprint computed from the current changelog, if any
    pub fn computed_checksum(&self) -> Option<&str> {
        self.computed_checksum.as_deref()
    }

    /// Get the request ID context, if any
    pub fn request_id(&self) -> Option<&RequestId> {
        self.request_id.as_ref()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the source error, if any
    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {:?}", self.code(), self.kind)?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(changelog_id) = &self.changelog_id {
            write!(f, " (changelog_id: {})", changelog_id)?;
        }
        if let Some(statement) = &self.statement {
            write!(f, " [statement: {}]", statement)?;
        }
        if let Some(source) = &self.source {
            write!(f, " caused by: {}", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Domain error taxonomy for changelog synthesis and verification
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DbControlError {
    // ===== Synthesis Errors =====
    /// Changelog carries no operation body
    #[error("Changelog {changelog_id} has no operation")]
    MissingOperation { changelog_id: String },

    /// Create-table operation is structurally invalid
    #[error("Invalid create-table in changelog {changelog_id}: {reason}")]
    InvalidCreateTable {
        changelog_id: String,
        reason: String,
    },

    /// Operation kind has no synthesizer
    #[error("Unsupported operation '{operation}' in changelog {changelog_id}")]
    UnsupportedOperation {
        changelog_id: String,
        operation: String,
    },

    // ===== Verification Errors =====
    /// Ledger fingerprint disagrees with the re-synthesized statement
    #[error("Changelog {changelog_id} md5 sum is {stored} but {computed}")]
    ChecksumMismatch {
        changelog_id: String,
        stored: String,
        computed: String,
    },

    // ===== Ledger Errors =====
    /// A ledger row for this changelog already exists
    #[error("Ledger already has an entry for changelog {changelog_id}")]
    DuplicateLedgerEntry { changelog_id: String },

    // ===== Input Errors =====
    /// Two changelogs in one run share an id
    #[error("Duplicate changelog id: {changelog_id}")]
    DuplicateChangelogId { changelog_id: String },

    /// Changelog declares more than one operation
    #[error("Changelog {changelog_id} declares more than one operation")]
    ConflictingOperations { changelog_id: String },
}

impl From<DbControlError> for ExError {
    fn from(err: DbControlError) -> Self {
        let message = err.to_string();
        match err {
            DbControlError::MissingOperation { changelog_id }
            | DbControlError::InvalidCreateTable { changelog_id, .. } => {
                ExError::new(ExErrorKind::InvalidOperation)
                    .with_op("synthesize")
                    .with_changelog_id(changelog_id)
                    .with_message(message)
            }

            DbControlError::UnsupportedOperation { changelog_id, .. } => {
                ExError::new(ExErrorKind::UnsupportedOperation)
                    .with_op("synthesize")
                    .with_changelog_id(changelog_id)
                    .with_message(message)
            }

            DbControlError::ChecksumMismatch {
                changelog_id,
                stored,
                computed,
            } => ExError::new(ExErrorKind::ChecksumMismatch)
                .with_op("verify_changelog")
                .with_changelog_id(changelog_id)
                .with_checksums(stored, computed)
                .with_message(message),

            DbControlError::DuplicateLedgerEntry { changelog_id } => {
                ExError::new(ExErrorKind::DuplicateLedgerEntry)
                    .with_op("ledger_record")
                    .with_changelog_id(changelog_id)
                    .with_message(message)
            }

            DbControlError::DuplicateChangelogId { changelog_id }
            | DbControlError::ConflictingOperations { changelog_id } => {
                ExError::new(ExErrorKind::InvalidInput)
                    .with_changelog_id(changelog_id)
                    .with_message(message)
            }
        }
    }
}

impl From<ExecError> for ExError {
    fn from(err: ExecError) -> Self {
        ExError::new(ExErrorKind::Execution).with_message(err.message())
    }
}

//! Canonical schema constants for structured logging and events
//!
//! These constants keep field names identical between the logging macros,
//! the engine, and tests that assert on captured events.
//!
//! `tracing` takes field names as identifiers at the call site, so emitters
//! spell them out; readers (the capture layer, tests) look them up through
//! these constants.

// Canonical field keys for structured logging
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";
pub const FIELD_REQUEST_ID: &str = "request_id";

// Changelog identifiers
pub const FIELD_CHANGELOG_ID: &str = "changelog_id";
pub const FIELD_CHECKSUM: &str = "checksum";
pub const FIELD_OUTCOME: &str = "outcome";

// Run sizes
pub const FIELD_CHANGELOG_COUNT: &str = "changelog_count";
pub const FIELD_APPLIED_COUNT: &str = "applied_count";

// Error fields
pub const FIELD_ERR_KIND: &str = "err_kind";
pub const FIELD_ERR_CODE: &str = "err_code";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";

// Canonical operation names
pub const OP_MIGRATE: &str = "migrate";
pub const OP_VERIFY: &str = "verify";
pub const OP_CHANGELOG_APPLY: &str = "changelog_apply";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants_accessibility() {
        assert!(!FIELD_COMPONENT.is_empty());
        assert!(!FIELD_OP.is_empty());
        assert!(!FIELD_CHANGELOG_ID.is_empty());
        assert!(!EVENT_START.is_empty());
        assert!(!EVENT_END.is_empty());
        assert!(!EVENT_END_ERROR.is_empty());
    }

    #[test]
    fn test_event_names_are_distinct() {
        assert_ne!(EVENT_START, EVENT_END);
        assert_ne!(EVENT_START, EVENT_END_ERROR);
        assert_ne!(EVENT_END, EVENT_END_ERROR);
    }

    #[test]
    fn test_op_names_are_distinct() {
        assert_ne!(OP_MIGRATE, OP_VERIFY);
        assert_ne!(OP_MIGRATE, OP_CHANGELOG_APPLY);
    }
}

//! Error types for paramcache operations

use thiserror::Error;

/// Storage layer errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("Storage lock poisoned")]
    LockPoisoned,

    #[error("Constraint violation: {reason}")]
    ConstraintViolation { reason: String },

    #[error("Backend error: {reason}")]
    Backend { reason: String },
}

/// Master error type for all cache operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CacheError {
    #[error("A `type` param must be included to create a cache entry")]
    MissingType,

    #[error("Schema mismatch for type {type_value:?}: {}", schema_mismatch_detail(missing, excess))]
    SchemaMismatch {
        type_value: String,
        /// Names the established schema expects but the caller omitted.
        missing: Vec<String>,
        /// Names the caller supplied that the schema does not contain.
        excess: Vec<String>,
    },

    #[error("No entry matches the given params")]
    NotFound,

    #[error("Expected one matching entry, found {count}")]
    MultipleFound { count: usize },

    #[error("Payload encode failed: {reason}")]
    Encode { reason: String },

    #[error("Payload decode failed: {reason}")]
    Decode { reason: String },

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Missing names take priority over excess names when both exist.
fn schema_mismatch_detail(missing: &[String], excess: &[String]) -> String {
    if !missing.is_empty() {
        format!("missing params {missing:?}")
    } else {
        format!("excess params {excess:?}")
    }
}

/// Result type alias for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_mismatch_reports_missing_first() {
        let err = CacheError::SchemaMismatch {
            type_value: "user".to_string(),
            missing: vec!["a".to_string()],
            excess: vec!["b".to_string()],
        };
        let msg = format!("{}", err);
        assert!(msg.contains("missing params"));
        assert!(msg.contains("\"a\""));
        assert!(!msg.contains("excess params"));
    }

    #[test]
    fn test_schema_mismatch_reports_excess_when_no_missing() {
        let err = CacheError::SchemaMismatch {
            type_value: "user".to_string(),
            missing: vec![],
            excess: vec!["b".to_string()],
        };
        let msg = format!("{}", err);
        assert!(msg.contains("excess params"));
        assert!(msg.contains("\"b\""));
    }

    #[test]
    fn test_multiple_found_display() {
        let err = CacheError::MultipleFound { count: 3 };
        let msg = format!("{}", err);
        assert!(msg.contains("found 3"));
    }

    #[test]
    fn test_cache_error_from_storage() {
        let err = CacheError::from(StorageError::LockPoisoned);
        assert!(matches!(err, CacheError::Storage(_)));
        assert!(format!("{}", err).contains("Lock poisoned"));
    }

    #[test]
    fn test_decode_error_display() {
        let err = CacheError::Decode {
            reason: "unexpected end of input".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("decode failed"));
        assert!(msg.contains("unexpected end of input"));
    }
}

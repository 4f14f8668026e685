//! Error types for the data-loader crate.
//!
//! Rust error handling concepts demonstrated:
//! - thiserror for defining custom error types
//! - Enum variants for different error cases
//! - `#[source]` to keep the underlying cause attached

use thiserror::Error;
use uuid::Uuid;

/// Errors raised by the meeting index and fixture loading.
///
/// The variants mirror how a caller reacts: `Validation` is bad input,
/// `NotFound` is a missing entity, `Conflict` is a uniqueness clash.
#[derive(Error, Debug)]
pub enum DataError {
    /// File could not be found or opened
    #[error("Failed to open file: {path}")]
    FileNotFound { path: String },

    /// I/O error occurred while reading file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// A fixture file was not valid JSON for its record type
    #[error("Malformed JSON in {file}: {source}")]
    JsonError {
        file: String,
        #[source]
        source: serde_json::Error,
    },

    /// Input failed a business rule (empty title, unmatched slot, ...)
    #[error("Validation failed: {0}")]
    ValidationError(String),

    /// Requested entity does not exist
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: Uuid },

    /// A user has not submitted availability for a meeting
    #[error("No availability from user {user_id} for meeting {meeting_id}")]
    NoAvailability { user_id: Uuid, meeting_id: Uuid },

    /// Entity would violate a uniqueness rule
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A record refers to an entity that was never loaded
    #[error("Missing reference: {entity} with id {id}")]
    MissingReference { entity: &'static str, id: Uuid },
}

impl DataError {
    pub fn validation(message: impl Into<String>) -> Self {
        DataError::ValidationError(message.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            DataError::NotFound { .. } | DataError::NoAvailability { .. }
        )
    }
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, DataError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let id = Uuid::nil();
        let err = DataError::NotFound { entity: "Meeting", id };
        assert_eq!(
            err.to_string(),
            "Meeting not found: 00000000-0000-0000-0000-000000000000"
        );
        assert!(err.is_not_found());

        let user_id = Uuid::from_u128(1);
        let meeting_id = Uuid::from_u128(2);
        let err = DataError::NoAvailability { user_id, meeting_id };
        assert_eq!(
            err.to_string(),
            "No availability from user 00000000-0000-0000-0000-000000000001 \
             for meeting 00000000-0000-0000-0000-000000000002"
        );
        assert!(err.is_not_found());

        let err = DataError::validation("Title is required");
        assert_eq!(err.to_string(), "Validation failed: Title is required");
        assert!(!err.is_not_found());
    }
}

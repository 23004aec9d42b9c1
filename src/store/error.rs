//! Store error types and result alias.
//!
//! Every collection backend maps its driver errors onto [`StoreError`] so the
//! book service can treat the memory and MongoDB backends identically.

use std::time::Duration;

use thiserror::Error;

/// Result type alias for collection operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors produced by a [`BookCollection`](crate::store::BookCollection).
#[derive(Debug, Error)]
pub enum StoreError {
    /// An insert collided with an existing record on the unique external ID.
    #[error("duplicate external id: {id}")]
    Duplicate { id: String },

    /// The operation did not finish before its deadline.
    #[error("{operation} timed out after {after:?}")]
    Timeout {
        operation: &'static str,
        after: Duration,
    },

    /// The store could not be reached.
    #[error("connection error: {0}")]
    Connection(String),

    /// The store accepted the call but failed to carry it out.
    #[error("backend error: {0}")]
    Backend(String),

    /// The store reported a state that the collection invariants rule out.
    #[error("invariant violation: {0}")]
    Invariant(String),
}

impl StoreError {
    pub fn duplicate(id: impl Into<String>) -> Self {
        Self::Duplicate { id: id.into() }
    }

    /// Whether this error is the store's own uniqueness guard firing.
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::Duplicate { .. })
    }
}

impl From<mongodb::error::Error> for StoreError {
    fn from(err: mongodb::error::Error) -> Self {
        use mongodb::error::ErrorKind;

        match err.kind.as_ref() {
            ErrorKind::ServerSelection { .. } | ErrorKind::Io(_) | ErrorKind::DnsResolve { .. } => {
                Self::Connection(err.to_string())
            }
            _ => Self::Backend(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_is_detected() {
        assert!(StoreError::duplicate("b1").is_duplicate());
        assert!(!StoreError::Backend("boom".into()).is_duplicate());
    }

    #[test]
    fn timeout_message_names_the_operation() {
        let err = StoreError::Timeout {
            operation: "insert_one",
            after: Duration::from_secs(10),
        };
        assert_eq!(err.to_string(), "insert_one timed out after 10s");
    }
}

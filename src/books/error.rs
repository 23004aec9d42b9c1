//! Book operation errors.

use thiserror::Error;

use crate::store::StoreError;

/// Outcome taxonomy for book operations.
///
/// The HTTP layer maps each variant to a fixed status: `Validation` → 400,
/// `Conflict` → 409, `NotFound` → 404, `Store` → 500.
#[derive(Debug, Error)]
pub enum BookError {
    #[error("missing required fields: {missing}")]
    Validation { missing: String },

    #[error("a book with id {id} already exists")]
    Conflict { id: String },

    #[error("book {id} not found")]
    NotFound { id: String },

    #[error("{operation} failed: {source}")]
    Store {
        operation: &'static str,
        #[source]
        source: StoreError,
    },
}

impl BookError {
    pub(crate) fn store(operation: &'static str) -> impl FnOnce(StoreError) -> Self {
        move |source| Self::Store { operation, source }
    }
}

pub type BookResult<T> = Result<T, BookError>;

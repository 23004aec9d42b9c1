//! Create, list, update and delete operations over a [`BookCollection`].
//!
//! # Invariants
//! - At most one live record per external id. Creation checks the count first
//!   and also relies on the collection's own uniqueness guard, so two racing
//!   creators cannot both succeed where the store enforces the constraint.
//! - Title and author are never empty on a stored record.
//! - Updates are sparse merges; a failed replace leaves the stored record as
//!   it was.

use std::sync::Arc;
use std::time::Duration;

use crate::books::error::{BookError, BookResult};
use crate::books::model::{BookFields, BookPatch, BookRecord, NewBook};
use crate::observability::metrics;
use crate::resilience::timeouts::with_deadline;
use crate::store::{BookCollection, StoreError, StoreResult};

/// Default deadline applied to every store round trip.
pub const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone)]
pub struct BookService {
    collection: Arc<dyn BookCollection>,
    operation_timeout: Duration,
}

impl BookService {
    pub fn new(collection: Arc<dyn BookCollection>) -> Self {
        Self {
            collection,
            operation_timeout: DEFAULT_OPERATION_TIMEOUT,
        }
    }

    pub fn with_operation_timeout(mut self, timeout: Duration) -> Self {
        self.operation_timeout = timeout;
        self
    }

    async fn call<T, F>(&self, operation: &'static str, call: F) -> StoreResult<T>
    where
        F: std::future::Future<Output = StoreResult<T>>,
    {
        let result = with_deadline(operation, self.operation_timeout, call).await;
        metrics::record_store_operation(operation, result.is_ok());
        result
    }

    /// Create a record from raw request fields.
    pub async fn create(&self, fields: &BookFields) -> BookResult<BookRecord> {
        let book = NewBook::from_fields(fields)?;

        let existing = self
            .call("count", self.collection.count(&book.id))
            .await
            .map_err(BookError::store("count"))?;
        if existing > 0 {
            return Err(BookError::Conflict { id: book.id });
        }

        let mut record = book.into_record();
        let inserted = self
            .call("insert_one", self.collection.insert_one(&record))
            .await;
        match inserted {
            Ok(handle) => {
                record.handle = Some(handle);
                tracing::info!(id = %record.id, "Book created");
                Ok(record)
            }
            Err(err) if err.is_duplicate() => Err(BookError::Conflict { id: record.id }),
            Err(err) => Err(BookError::store("insert_one")(err)),
        }
    }

    /// Every live record, in store-native order.
    pub async fn read_all(&self) -> BookResult<Vec<BookRecord>> {
        self.call("find_all", self.collection.find_all())
            .await
            .map_err(BookError::store("find_all"))
    }

    /// Merge the non-empty fields of `fields` into the record named `id`.
    pub async fn update(&self, id: &str, fields: &BookFields) -> BookResult<BookRecord> {
        let current = self
            .call("find_one", self.collection.find_one(id))
            .await
            .map_err(BookError::store("find_one"))?
            .ok_or_else(|| BookError::NotFound { id: id.to_string() })?;

        let patch = BookPatch::from_fields(fields);
        if patch.is_empty() {
            tracing::debug!(id, "Update carries no changes");
        }
        let merged = patch.apply(&current);

        let matched = self
            .call("replace_one", self.collection.replace_one(id, &merged))
            .await
            .map_err(BookError::store("replace_one"))?;
        if matched == 0 {
            // Deleted between the lookup and the replace.
            return Err(BookError::NotFound { id: id.to_string() });
        }

        tracing::info!(id, "Book updated");
        Ok(merged)
    }

    /// Remove the record named `id`.
    pub async fn delete(&self, id: &str) -> BookResult<()> {
        let deleted = self
            .call("delete_one", self.collection.delete_one(id))
            .await
            .map_err(BookError::store("delete_one"))?;

        match deleted {
            0 => Err(BookError::NotFound { id: id.to_string() }),
            1 => {
                tracing::info!(id, "Book deleted");
                Ok(())
            }
            n => Err(BookError::store("delete_one")(StoreError::Invariant(format!(
                "{n} records deleted for id {id}"
            )))),
        }
    }

    /// Check that the backing store answers.
    pub async fn ping(&self) -> BookResult<()> {
        self.call("ping", self.collection.ping())
            .await
            .map_err(BookError::store("ping"))
    }
}

//! Document store subsystem.
//!
//! # Data Flow
//! ```text
//! BookService (books/service.rs)
//!     → BookCollection trait (equality filter on `id`, single-document writes)
//!     → memory.rs  (DashMap keyed by external id; tests, --memory)
//!     → mongo.rs   (MongoDB collection with a unique index on `id`)
//! ```
//!
//! # Design Decisions
//! - Collections are `Send + Sync` and shared behind an `Arc`; each call is an
//!   independent round trip, no client-side locking.
//! - Lookups use the caller-supplied external id only. The internal handle is
//!   returned for completeness but never used as a key.
//! - Backends enforce uniqueness of the external id on insert and report a
//!   collision as [`StoreError::Duplicate`].

pub mod error;
pub mod memory;
pub mod mongo;

use async_trait::async_trait;

use crate::books::{BookRecord, InternalHandle};

pub use error::{StoreError, StoreResult};
pub use memory::MemoryCollection;
pub use mongo::MongoCollection;

/// Handle to the collection holding book records.
///
/// Every filter is an equality match on the external id.
#[async_trait]
pub trait BookCollection: Send + Sync {
    /// Number of records whose external id equals `id`.
    async fn count(&self, id: &str) -> StoreResult<u64>;

    /// Insert a new record and return the handle the store assigned to it.
    ///
    /// Fails with [`StoreError::Duplicate`] if the external id is taken.
    async fn insert_one(&self, record: &BookRecord) -> StoreResult<InternalHandle>;

    /// Every live record, in store-native order.
    async fn find_all(&self) -> StoreResult<Vec<BookRecord>>;

    /// The record whose external id equals `id`, if any.
    async fn find_one(&self, id: &str) -> StoreResult<Option<BookRecord>>;

    /// Replace the record whose external id equals `id`. Returns the number of
    /// records matched (0 or 1).
    async fn replace_one(&self, id: &str, record: &BookRecord) -> StoreResult<u64>;

    /// Delete at most one record whose external id equals `id`. Returns the
    /// number deleted.
    async fn delete_one(&self, id: &str) -> StoreResult<u64>;

    /// Verify the store is reachable.
    async fn ping(&self) -> StoreResult<()>;
}

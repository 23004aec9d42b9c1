//! Timeout enforcement.
//!
//! # Responsibilities
//! - Bound every store round trip with a deadline
//! - Cancel the in-flight call when the deadline passes
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities; dropping the future aborts the call
//! - Timeout errors are distinct from other store errors

use std::future::Future;
use std::time::Duration;

use crate::store::{StoreError, StoreResult};

/// Run `call` with a deadline, mapping expiry to [`StoreError::Timeout`].
pub async fn with_deadline<T, F>(operation: &'static str, after: Duration, call: F) -> StoreResult<T>
where
    F: Future<Output = StoreResult<T>>,
{
    match tokio::time::timeout(after, call).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(operation, ?after, "Store call timed out");
            Err(StoreError::Timeout { operation, after })
        }
    }
}

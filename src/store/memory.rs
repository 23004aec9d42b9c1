//! In-memory book collection.
//!
//! Records live in a [`DashMap`] keyed by external id, which makes the
//! uniqueness check and the insert a single atomic step. Handles are random
//! UUIDs. Nothing is persisted; all clones share the same map.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use uuid::Uuid;

use crate::books::{BookRecord, InternalHandle};
use crate::store::{BookCollection, StoreError, StoreResult};

#[derive(Clone, Default)]
pub struct MemoryCollection {
    records: Arc<DashMap<String, BookRecord>>,
}

impl MemoryCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl BookCollection for MemoryCollection {
    async fn count(&self, id: &str) -> StoreResult<u64> {
        Ok(u64::from(self.records.contains_key(id)))
    }

    async fn insert_one(&self, record: &BookRecord) -> StoreResult<InternalHandle> {
        match self.records.entry(record.id.clone()) {
            Entry::Occupied(_) => Err(StoreError::duplicate(&record.id)),
            Entry::Vacant(slot) => {
                let handle = InternalHandle::new(Uuid::new_v4().to_string());
                slot.insert(BookRecord {
                    handle: Some(handle.clone()),
                    ..record.clone()
                });
                Ok(handle)
            }
        }
    }

    async fn find_all(&self) -> StoreResult<Vec<BookRecord>> {
        Ok(self.records.iter().map(|r| r.value().clone()).collect())
    }

    async fn find_one(&self, id: &str) -> StoreResult<Option<BookRecord>> {
        Ok(self.records.get(id).map(|r| r.value().clone()))
    }

    async fn replace_one(&self, id: &str, record: &BookRecord) -> StoreResult<u64> {
        match self.records.get_mut(id) {
            Some(mut existing) => {
                let handle = existing.handle.clone();
                *existing = BookRecord {
                    handle,
                    id: id.to_string(),
                    ..record.clone()
                };
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete_one(&self, id: &str) -> StoreResult<u64> {
        Ok(u64::from(self.records.remove(id).is_some()))
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}

//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Request, Response};
use axum::Router;
use serde_json::Value;

use book_inventory::books::{BookRecord, BookService, InternalHandle};
use book_inventory::config::{ServiceConfig, StoreBackend};
use book_inventory::http::{build_router, AppState};
use book_inventory::observability::MemorySink;
use book_inventory::store::{BookCollection, MemoryCollection, StoreError, StoreResult};

pub fn memory_config() -> ServiceConfig {
    let mut config = ServiceConfig::default();
    config.store.backend = StoreBackend::Memory;
    config.store.seed_examples = false;
    config
}

/// Router over `collection` with an in-memory diagnostic sink.
pub fn app_with(collection: Arc<dyn BookCollection>) -> (Router, MemorySink) {
    let sink = MemorySink::new();
    let state = AppState::new(BookService::new(collection)).unwrap();
    let router = build_router(&memory_config(), state, Arc::new(sink.clone()));
    (router, sink)
}

pub fn memory_app() -> (Router, MemorySink) {
    app_with(Arc::new(MemoryCollection::new()))
}

pub fn json_request(method: &str, uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

/// Which collection call a [`FaultyCollection`] fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    Count,
    Insert,
    FindAll,
    FindOne,
    Replace,
    Delete,
}

/// Wraps a memory collection and fails one operation with a backend error.
pub struct FaultyCollection {
    inner: MemoryCollection,
    fault: Fault,
}

pub const FAULT_TEXT: &str = "connection reset by peer at 10.0.0.7:27017";

impl FaultyCollection {
    pub fn new(inner: MemoryCollection, fault: Fault) -> Self {
        Self { inner, fault }
    }

    fn check(&self, op: Fault) -> StoreResult<()> {
        if self.fault == op {
            Err(StoreError::Backend(FAULT_TEXT.to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl BookCollection for FaultyCollection {
    async fn count(&self, id: &str) -> StoreResult<u64> {
        self.check(Fault::Count)?;
        self.inner.count(id).await
    }

    async fn insert_one(&self, record: &BookRecord) -> StoreResult<InternalHandle> {
        self.check(Fault::Insert)?;
        self.inner.insert_one(record).await
    }

    async fn find_all(&self) -> StoreResult<Vec<BookRecord>> {
        self.check(Fault::FindAll)?;
        self.inner.find_all().await
    }

    async fn find_one(&self, id: &str) -> StoreResult<Option<BookRecord>> {
        self.check(Fault::FindOne)?;
        self.inner.find_one(id).await
    }

    async fn replace_one(&self, id: &str, record: &BookRecord) -> StoreResult<u64> {
        self.check(Fault::Replace)?;
        self.inner.replace_one(id, record).await
    }

    async fn delete_one(&self, id: &str) -> StoreResult<u64> {
        self.check(Fault::Delete)?;
        self.inner.delete_one(id).await
    }

    async fn ping(&self) -> StoreResult<()> {
        self.inner.ping().await
    }
}

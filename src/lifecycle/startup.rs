//! Startup orchestration.
//!
//! # Responsibilities
//! - Open the configured collection and make sure it answers
//! - Seed the sample books when enabled
//! - Assemble the HTTP server
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Subsystems initialize in order, not concurrently

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::books::seed::seed_examples;
use crate::books::{BookError, BookService};
use crate::config::{ServiceConfig, StoreBackend, StoreConfig};
use crate::http::{AppState, HttpServer};
use crate::observability::DiagnosticSink;
use crate::store::{BookCollection, MemoryCollection, MongoCollection, StoreError};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("store unavailable: {0}")]
    Store(#[from] StoreError),

    #[error("store check failed: {0}")]
    Books(#[from] BookError),

    #[error("failed to load templates: {0}")]
    Views(#[from] minijinja::Error),
}

/// Open the collection selected by `config.backend`.
pub async fn open_collection(config: &StoreConfig) -> Result<Arc<dyn BookCollection>, StoreError> {
    match config.backend {
        StoreBackend::Memory => {
            tracing::warn!("Using the in-memory store; records are lost on exit");
            Ok(Arc::new(MemoryCollection::new()))
        }
        StoreBackend::Mongodb => Ok(Arc::new(MongoCollection::connect(config).await?)),
    }
}

/// Build a ready-to-run server from a validated configuration.
pub async fn bootstrap(
    config: ServiceConfig,
    sink: Arc<dyn DiagnosticSink>,
) -> Result<HttpServer, StartupError> {
    let collection = open_collection(&config.store).await?;
    let books = BookService::new(collection)
        .with_operation_timeout(Duration::from_secs(config.store.operation_timeout_secs));
    books.ping().await?;

    if config.store.seed_examples {
        seed_examples(&books).await?;
    }

    let state = AppState::new(books)?;
    Ok(HttpServer::new(&config, state, sink))
}

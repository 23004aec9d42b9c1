//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the API, page and static routes
//! - Wire up middleware (request ID, tracing, capture, timeout)
//! - Bind server to listener
//! - Stop accepting and drain on shutdown

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{HeaderName, Request};
use axum::routing::{get, put};
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tracing::Span;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    services::ServeDir,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::books::BookService;
use crate::config::ServiceConfig;
use crate::http::handlers::{create_book, delete_book, list_books, update_book};
use crate::http::middleware::{CaptureLayer, CaptureLimits};
use crate::http::request::X_REQUEST_ID;
use crate::observability::DiagnosticSink;
use crate::views::{self, Views};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub books: BookService,
    pub views: Arc<Views>,
}

impl AppState {
    pub fn new(books: BookService) -> Result<Self, minijinja::Error> {
        Ok(Self {
            books,
            views: Arc::new(Views::new()?),
        })
    }
}

/// Per-request span carrying the id assigned by `SetRequestIdLayer`, so every
/// event logged while serving the request can be correlated.
fn request_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-");
    tracing::info_span!(
        "request",
        method = %request.method(),
        uri = %request.uri(),
        request_id = %request_id,
    )
}

/// Build the Axum router with all middleware layers.
///
/// Layers, outermost first: request id, trace, capture, request id
/// propagation, timeout.
#[allow(deprecated)]
pub fn build_router(
    config: &ServiceConfig,
    state: AppState,
    sink: Arc<dyn DiagnosticSink>,
) -> Router {
    let request_id = HeaderName::from_static(X_REQUEST_ID);
    let mut router = Router::new()
        .route("/api/books", get(list_books).post(create_book))
        .route("/api/books/{id}", put(update_book).delete(delete_book))
        .merge(views::routes())
        .nest_service("/css", ServeDir::new(&config.views.static_dir))
        .with_state(state)
        .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
        .layer(PropagateRequestIdLayer::new(request_id.clone()));

    if config.diagnostics.enabled {
        let limits = CaptureLimits {
            max_request_body_bytes: config.diagnostics.max_request_body_bytes,
            max_capture_bytes: config.diagnostics.max_capture_bytes,
        };
        router = router.layer(CaptureLayer::new(sink, limits));
    }

    router
        .layer(TraceLayer::new_for_http().make_span_with(request_span))
        .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
}

/// HTTP server for the book inventory.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: &ServiceConfig, state: AppState, sink: Arc<dyn DiagnosticSink>) -> Self {
        Self {
            router: build_router(config, state, sink),
        }
    }

    /// Run the server, accepting connections until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// The assembled router, for driving the app without a socket.
    pub fn into_router(self) -> Router {
        self.router
    }
}

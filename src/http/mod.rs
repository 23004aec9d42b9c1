//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → middleware/capture.rs (buffer request body, tee response body)
//!     → request.rs (flat JSON body extraction)
//!     → handlers.rs / views (BookService calls)
//!     → response.rs (BookError → status + {"error": ...})
//!     → Send to client
//! ```

pub mod handlers;
pub mod middleware;
pub mod request;
pub mod response;
pub mod server;

pub use request::{BookId, BookPayload, X_REQUEST_ID};
pub use response::ApiError;
pub use server::{build_router, AppState, HttpServer};

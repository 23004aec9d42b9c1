//! Book inventory service library.
//!
//! A JSON API and a handful of server-rendered pages over a document
//! collection of book records, with a middleware that logs every request and
//! response body without altering either.

pub mod books;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod store;
pub mod views;

pub use books::{BookError, BookRecord, BookService};
pub use config::ServiceConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;

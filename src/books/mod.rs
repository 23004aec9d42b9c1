//! Book inventory domain.
//!
//! # Data Flow
//! ```text
//! HTTP handler (flat string map)
//!     → model.rs   (NewBook validation / BookPatch sparse merge)
//!     → service.rs (BookService: create, read_all, update, delete)
//!     → store::BookCollection
//! ```

pub mod error;
pub mod model;
pub mod seed;
pub mod service;

pub use error::{BookError, BookResult};
pub use model::{BookFields, BookPatch, BookRecord, InternalHandle, NewBook};
pub use service::BookService;

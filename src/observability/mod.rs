//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs     (structured log events via tracing)
//!     → metrics.rs     (counters, histograms)
//!     → diagnostics.rs (one request/response block per exchange)
//!
//! Consumers:
//!     → stdout (pretty or JSON)
//!     → Prometheus scrape endpoint (optional)
//! ```
//!
//! # Design Decisions
//! - Request ID flows through every log line via the trace span
//! - Diagnostic blocks go through a sink trait so tests can read them back

pub mod diagnostics;
pub mod logging;
pub mod metrics;

pub use diagnostics::{CapturedExchange, DiagnosticSink, MemorySink, TracingSink};

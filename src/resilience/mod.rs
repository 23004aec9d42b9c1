//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! BookService store call:
//!     → timeouts.rs (enforce the per-operation deadline)
//!     → On expiry: StoreError::Timeout → HTTP 500
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every store call has a deadline
//! - No retries: a failed write is surfaced, never replayed

pub mod timeouts;

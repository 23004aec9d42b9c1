//! Tower middleware owned by this crate.

pub mod capture;

pub use capture::{CaptureLayer, CaptureLimits, CaptureService};

//! Metrics collection and exposition.
//!
//! # Metrics
//! - `books_requests_total` (counter): requests by method, status
//! - `books_request_duration_seconds` (histogram): handler latency
//! - `books_store_operations_total` (counter): store calls by operation, outcome
//!
//! Recording is a no-op until [`init_metrics`] installs the Prometheus
//! recorder.

use std::net::SocketAddr;
use std::time::Duration;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_request(method: &str, status: u16, elapsed: Duration) {
    ::metrics::counter!(
        "books_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    ::metrics::histogram!("books_request_duration_seconds").record(elapsed.as_secs_f64());
}

pub fn record_store_operation(operation: &'static str, ok: bool) {
    let outcome = if ok { "ok" } else { "error" };
    ::metrics::counter!(
        "books_store_operations_total",
        "operation" => operation,
        "outcome" => outcome
    )
    .increment(1);
}

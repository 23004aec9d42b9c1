//! Request/response diagnostic records.
//!
//! A [`CapturedExchange`] is built by the capture middleware for one request,
//! handed to a [`DiagnosticSink`] once the response body has finished, and
//! then dropped. Its `Display` form is the plain-text block written to the
//! log.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use axum::http::{HeaderMap, Method, StatusCode};
use bytes::Bytes;
use parking_lot::Mutex;

const DIVIDER: &str = "────────────────────────────────────────────────────────────";

/// Tracing target used by [`TracingSink`].
pub const DIAGNOSTICS_TARGET: &str = "book_inventory::diagnostics";

/// Snapshot of one HTTP exchange.
#[derive(Debug, Clone)]
pub struct CapturedExchange {
    pub method: Method,
    pub path: String,
    pub request_headers: HeaderMap,
    pub request_body: Bytes,
    /// `None` when the inner service failed without producing a response.
    pub status: Option<StatusCode>,
    pub response_headers: HeaderMap,
    pub response_body: Bytes,
    /// More bytes were sent to the client than were kept here.
    pub response_truncated: bool,
    /// The body stream ended normally (not cut short by an error or drop).
    pub response_complete: bool,
    pub elapsed: Duration,
}

fn write_headers(f: &mut fmt::Formatter<'_>, headers: &HeaderMap) -> fmt::Result {
    if headers.is_empty() {
        return writeln!(f, "(none)");
    }
    for name in headers.keys() {
        let values: Vec<_> = headers
            .get_all(name)
            .iter()
            .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
            .collect();
        writeln!(f, "  {}: {}", name, values.join(", "))?;
    }
    Ok(())
}

impl fmt::Display for CapturedExchange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        writeln!(f, "{DIVIDER}")?;
        writeln!(
            f,
            "{} {}  ({} ms)",
            self.method,
            self.path,
            self.elapsed.as_millis()
        )?;
        writeln!(f)?;
        writeln!(f, "Request headers")?;
        write_headers(f, &self.request_headers)?;
        writeln!(f, "Request body")?;
        writeln!(f, "{}", String::from_utf8_lossy(&self.request_body))?;
        writeln!(f)?;

        match self.status {
            Some(status) => writeln!(
                f,
                "→ {} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("")
            )?,
            None => writeln!(f, "→ (no response)")?,
        }
        writeln!(f, "Response headers")?;
        write_headers(f, &self.response_headers)?;
        writeln!(f, "Response body")?;
        writeln!(f, "{}", String::from_utf8_lossy(&self.response_body))?;
        if self.response_truncated {
            writeln!(f, "(truncated after {} bytes)", self.response_body.len())?;
        }
        if !self.response_complete {
            writeln!(f, "(response body did not complete)")?;
        }
        write!(f, "{DIVIDER}")
    }
}

/// Destination for finished diagnostic records.
pub trait DiagnosticSink: Send + Sync + 'static {
    fn record(&self, exchange: CapturedExchange);
}

/// Writes each record as one INFO event under [`DIAGNOSTICS_TARGET`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn record(&self, exchange: CapturedExchange) {
        tracing::info!(target: DIAGNOSTICS_TARGET, "{exchange}");
    }
}

/// Keeps records in memory so tests can inspect them.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    exchanges: Arc<Mutex<Vec<CapturedExchange>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn exchanges(&self) -> Vec<CapturedExchange> {
        self.exchanges.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.exchanges.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.exchanges.lock().is_empty()
    }
}

impl DiagnosticSink for MemorySink {
    fn record(&self, exchange: CapturedExchange) {
        self.exchanges.lock().push(exchange);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::{CONTENT_TYPE, SET_COOKIE};
    use axum::http::HeaderValue;

    fn exchange() -> CapturedExchange {
        let mut request_headers = HeaderMap::new();
        request_headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let mut response_headers = HeaderMap::new();
        response_headers.append(SET_COOKIE, HeaderValue::from_static("a=1"));
        response_headers.append(SET_COOKIE, HeaderValue::from_static("b=2"));

        CapturedExchange {
            method: Method::POST,
            path: "/api/books".into(),
            request_headers,
            request_body: Bytes::from_static(br#"{"id":"b1"}"#),
            status: Some(StatusCode::CREATED),
            response_headers,
            response_body: Bytes::from_static(b"ok"),
            response_truncated: false,
            response_complete: true,
            elapsed: Duration::from_millis(12),
        }
    }

    #[test]
    fn renders_fenced_block() {
        let rendered = exchange().to_string();
        let lines: Vec<&str> = rendered.lines().collect();

        assert_eq!(lines[1], DIVIDER);
        assert_eq!(lines[2], "POST /api/books  (12 ms)");
        assert!(rendered.contains("Request headers\n  content-type: application/json\n"));
        assert!(rendered.contains("Request body\n{\"id\":\"b1\"}\n"));
        assert!(rendered.contains("→ 201 Created\n"));
        assert!(rendered.contains("  set-cookie: a=1, b=2\n"));
        assert!(rendered.contains("Response body\nok\n"));
        assert_eq!(lines.last().copied(), Some(DIVIDER));
    }

    #[test]
    fn renders_missing_parts() {
        let mut exchange = exchange();
        exchange.request_headers.clear();
        exchange.status = None;
        exchange.response_headers.clear();
        exchange.response_body = Bytes::new();
        exchange.response_complete = false;

        let rendered = exchange.to_string();
        assert!(rendered.contains("Request headers\n(none)\n"));
        assert!(rendered.contains("→ (no response)\n"));
        assert!(rendered.contains("Response headers\n(none)\n"));
        assert!(rendered.contains("(response body did not complete)"));
    }

    #[test]
    fn memory_sink_collects_records() {
        let sink = MemorySink::new();
        sink.record(exchange());
        assert_eq!(sink.len(), 1);
        assert_eq!(sink.exchanges()[0].path, "/api/books");
    }
}

//! Request/response capture middleware.
//!
//! # Responsibilities
//! - Buffer the request body and hand the inner service an identical copy
//! - Forward response frames untouched while copying them for diagnostics
//! - Emit one [`CapturedExchange`] per request once the response body is done
//!
//! # Design Decisions
//! - Request bodies are small JSON documents, so they are fully buffered up to
//!   `max_request_body_bytes`
//! - Response capture is capped at `max_capture_bytes`; the client still gets
//!   every byte
//! - Inner service errors are returned unchanged after the record is emitted
//! - Elapsed time covers only the inner service call

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::{Duration, Instant};

use axum::body::Body;
use axum::http::{header::CONTENT_LENGTH, HeaderMap, Method, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use bytes::{Bytes, BytesMut};
use futures_util::future::BoxFuture;
use futures_util::StreamExt;
use hyper::body::{Body as HttpBody, Frame, SizeHint};
use tower::{Layer, Service};

use crate::http::response::ApiError;
use crate::observability::diagnostics::{CapturedExchange, DiagnosticSink};
use crate::observability::metrics;

/// Size limits applied by the capture middleware.
#[derive(Debug, Clone, Copy)]
pub struct CaptureLimits {
    pub max_request_body_bytes: usize,
    pub max_capture_bytes: usize,
}

impl Default for CaptureLimits {
    fn default() -> Self {
        Self {
            max_request_body_bytes: 1024 * 1024,
            max_capture_bytes: 64 * 1024,
        }
    }
}

#[derive(Clone)]
pub struct CaptureLayer {
    sink: Arc<dyn DiagnosticSink>,
    limits: CaptureLimits,
}

impl CaptureLayer {
    pub fn new(sink: Arc<dyn DiagnosticSink>, limits: CaptureLimits) -> Self {
        Self { sink, limits }
    }
}

impl<S> Layer<S> for CaptureLayer {
    type Service = CaptureService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        CaptureService {
            inner,
            sink: self.sink.clone(),
            limits: self.limits,
        }
    }
}

#[derive(Clone)]
pub struct CaptureService<S> {
    inner: S,
    sink: Arc<dyn DiagnosticSink>,
    limits: CaptureLimits,
}

impl<S> Service<Request<Body>> for CaptureService<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
    S::Error: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Response, S::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request<Body>) -> Self::Future {
        // The clone stays behind; the instance that was polled ready runs this call.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        let sink = self.sink.clone();
        let limits = self.limits;

        Box::pin(async move {
            let (parts, body) = request.into_parts();
            let mut pending = PendingExchange {
                method: parts.method.clone(),
                path: parts.uri.path().to_string(),
                request_headers: parts.headers.clone(),
                request_body: Bytes::new(),
                status: None,
                response_headers: HeaderMap::new(),
                elapsed: Duration::ZERO,
            };

            if content_length(&parts.headers).is_some_and(|len| len > limits.max_request_body_bytes) {
                let rejection = ApiError::payload_too_large().into_response();
                return Ok(pending.attach(rejection, sink, limits));
            }

            let body_bytes = match read_limited(body, limits.max_request_body_bytes).await {
                Ok(bytes) => bytes,
                Err(BodyReadError::TooLarge) => {
                    let rejection = ApiError::payload_too_large().into_response();
                    return Ok(pending.attach(rejection, sink, limits));
                }
                Err(BodyReadError::Failed(err)) => {
                    tracing::warn!(error = %err, "Failed to read request body");
                    let rejection = ApiError::invalid_body().into_response();
                    return Ok(pending.attach(rejection, sink, limits));
                }
            };
            pending.request_body = body_bytes.clone();
            let request = Request::from_parts(parts, Body::from(body_bytes));

            let start = Instant::now();
            let result = inner.call(request).await;
            pending.elapsed = start.elapsed();

            match result {
                Ok(response) => Ok(pending.attach(response, sink, limits)),
                Err(err) => {
                    tracing::warn!(
                        method = %pending.method,
                        path = %pending.path,
                        "Inner service failed"
                    );
                    sink.record(pending.into_exchange(Bytes::new(), false, false));
                    Err(err)
                }
            }
        })
    }
}

fn content_length(headers: &HeaderMap) -> Option<usize> {
    headers
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
}

enum BodyReadError {
    TooLarge,
    Failed(axum::Error),
}

/// Buffer `body`, giving up as soon as it grows past `limit` bytes whether or
/// not a `Content-Length` was declared.
async fn read_limited(body: Body, limit: usize) -> Result<Bytes, BodyReadError> {
    let mut stream = body.into_data_stream();
    let mut buffer = BytesMut::new();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(BodyReadError::Failed)?;
        if buffer.len() + chunk.len() > limit {
            return Err(BodyReadError::TooLarge);
        }
        buffer.extend_from_slice(&chunk);
    }
    Ok(buffer.freeze())
}

/// Everything known about an exchange before the response body is read.
struct PendingExchange {
    method: Method,
    path: String,
    request_headers: HeaderMap,
    request_body: Bytes,
    status: Option<StatusCode>,
    response_headers: HeaderMap,
    elapsed: Duration,
}

impl PendingExchange {
    /// Record the final status and headers and wrap the body so the record is
    /// emitted once the body is done.
    fn attach(
        mut self,
        response: Response,
        sink: Arc<dyn DiagnosticSink>,
        limits: CaptureLimits,
    ) -> Response {
        let (parts, body) = response.into_parts();
        metrics::record_request(self.method.as_str(), parts.status.as_u16(), self.elapsed);
        self.status = Some(parts.status);
        self.response_headers = parts.headers.clone();

        let body = TeeBody {
            inner: body,
            captured: BytesMut::new(),
            limit: limits.max_capture_bytes,
            truncated: false,
            pending: Some(self),
            sink,
        };
        Response::from_parts(parts, Body::new(body))
    }

    fn into_exchange(self, response_body: Bytes, truncated: bool, complete: bool) -> CapturedExchange {
        CapturedExchange {
            method: self.method,
            path: self.path,
            request_headers: self.request_headers,
            request_body: self.request_body,
            status: self.status,
            response_headers: self.response_headers,
            response_body,
            response_truncated: truncated,
            response_complete: complete,
            elapsed: self.elapsed,
        }
    }
}

/// Response body that forwards every frame and keeps a bounded copy of the
/// data it has seen.
struct TeeBody {
    inner: Body,
    captured: BytesMut,
    limit: usize,
    truncated: bool,
    pending: Option<PendingExchange>,
    sink: Arc<dyn DiagnosticSink>,
}

impl TeeBody {
    fn capture(&mut self, data: &Bytes) {
        let room = self.limit.saturating_sub(self.captured.len());
        if data.len() > room {
            self.truncated = true;
        }
        self.captured.extend_from_slice(&data[..data.len().min(room)]);
    }

    fn finish(&mut self, complete: bool) {
        if let Some(pending) = self.pending.take() {
            let body = std::mem::take(&mut self.captured).freeze();
            self.sink
                .record(pending.into_exchange(body, self.truncated, complete));
        }
    }
}

impl HttpBody for TeeBody {
    type Data = Bytes;
    type Error = axum::Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let this = self.get_mut();
        match Pin::new(&mut this.inner).poll_frame(cx) {
            Poll::Ready(Some(Ok(frame))) => {
                if let Some(data) = frame.data_ref() {
                    this.capture(data);
                }
                // The server may stop polling once the inner body reports its end.
                if this.inner.is_end_stream() {
                    this.finish(true);
                }
                Poll::Ready(Some(Ok(frame)))
            }
            Poll::Ready(Some(Err(err))) => {
                this.finish(false);
                Poll::Ready(Some(Err(err)))
            }
            Poll::Ready(None) => {
                this.finish(true);
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }

    fn is_end_stream(&self) -> bool {
        self.inner.is_end_stream()
    }

    fn size_hint(&self) -> SizeHint {
        self.inner.size_hint()
    }
}

impl Drop for TeeBody {
    fn drop(&mut self) {
        let complete = self.inner.is_end_stream();
        self.finish(complete);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observability::MemorySink;
    use axum::body::to_bytes;
    use std::convert::Infallible;
    use tower::{service_fn, ServiceExt};

    fn layer(sink: &MemorySink, limits: CaptureLimits) -> CaptureLayer {
        CaptureLayer::new(Arc::new(sink.clone()), limits)
    }

    /// Echoes the request body back in three streamed chunks.
    async fn echo(request: Request<Body>) -> Result<Response, Infallible> {
        let body = to_bytes(request.into_body(), usize::MAX).await.unwrap_or_default();
        let third = body.len() / 3;
        let chunks = vec![
            Ok::<_, std::io::Error>(body.slice(..third)),
            Ok(body.slice(third..2 * third)),
            Ok(body.slice(2 * third..)),
        ];
        Ok(Response::builder()
            .status(StatusCode::CREATED)
            .header("x-echo", "1")
            .body(Body::from_stream(futures_util::stream::iter(chunks)))
            .unwrap_or_default())
    }

    #[tokio::test]
    async fn handler_and_client_see_identical_bytes() {
        let sink = MemorySink::new();
        let service = layer(&sink, CaptureLimits::default()).layer(service_fn(echo));
        let payload = br#"{"id":"b1","title":"T","author":"A"}"#;

        let response = service
            .oneshot(
                Request::post("/api/books")
                    .header("content-type", "application/json")
                    .body(Body::from(&payload[..]))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert!(sink.is_empty(), "record must wait for the body to finish");

        let received = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&received[..], &payload[..]);

        let exchanges = sink.exchanges();
        assert_eq!(exchanges.len(), 1);
        let exchange = &exchanges[0];
        assert_eq!(exchange.method, Method::POST);
        assert_eq!(exchange.path, "/api/books");
        assert_eq!(&exchange.request_body[..], &payload[..]);
        assert_eq!(exchange.response_body, received);
        assert_eq!(exchange.status, Some(StatusCode::CREATED));
        assert_eq!(exchange.response_headers["x-echo"], "1");
        assert!(exchange.response_complete);
        assert!(!exchange.response_truncated);
    }

    #[tokio::test]
    async fn capture_is_capped_but_client_gets_everything() {
        let sink = MemorySink::new();
        let limits = CaptureLimits {
            max_capture_bytes: 4,
            ..CaptureLimits::default()
        };
        let service = layer(&sink, limits).layer(service_fn(echo));

        let response = service
            .oneshot(Request::post("/").body(Body::from("abcdefghij")).unwrap())
            .await
            .unwrap();
        let received = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&received[..], b"abcdefghij");

        let exchange = &sink.exchanges()[0];
        assert_eq!(&exchange.response_body[..], b"abcd");
        assert!(exchange.response_truncated);
    }

    #[tokio::test]
    async fn inner_errors_pass_through_unchanged() {
        let sink = MemorySink::new();
        let failing = service_fn(|_request: Request<Body>| async {
            Err::<Response, _>(std::io::Error::other("boom"))
        });
        let service = layer(&sink, CaptureLimits::default()).layer(failing);

        let err = service
            .oneshot(Request::put("/api/books/b1").body(Body::from("{}")).unwrap())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "boom");

        let exchange = &sink.exchanges()[0];
        assert_eq!(exchange.status, None);
        assert_eq!(&exchange.request_body[..], b"{}");
    }

    #[tokio::test]
    async fn oversized_declared_body_is_rejected_before_reading() {
        let sink = MemorySink::new();
        let limits = CaptureLimits {
            max_request_body_bytes: 8,
            ..CaptureLimits::default()
        };
        let service = layer(&sink, limits).layer(service_fn(echo));

        let response = service
            .oneshot(
                Request::post("/api/books")
                    .header("content-length", "64")
                    .body(Body::from(vec![b'x'; 64]))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);

        drop(response);
        assert_eq!(sink.exchanges()[0].status, Some(StatusCode::PAYLOAD_TOO_LARGE));
    }

    #[tokio::test]
    async fn oversized_streamed_body_is_rejected() {
        let sink = MemorySink::new();
        let limits = CaptureLimits {
            max_request_body_bytes: 8,
            ..CaptureLimits::default()
        };
        let service = layer(&sink, limits).layer(service_fn(echo));
        let chunks = vec![
            Ok::<_, std::io::Error>(Bytes::from_static(b"abcdef")),
            Ok(Bytes::from_static(b"ghijkl")),
        ];

        let request = Request::post("/api/books")
            .body(Body::from_stream(futures_util::stream::iter(chunks)))
            .unwrap();
        assert!(request.headers().get(CONTENT_LENGTH).is_none());

        let response = service.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], br#"{"error":"Request body too large"}"#);
    }

    #[tokio::test]
    async fn body_at_the_limit_is_accepted() {
        let sink = MemorySink::new();
        let limits = CaptureLimits {
            max_request_body_bytes: 6,
            ..CaptureLimits::default()
        };
        let service = layer(&sink, limits).layer(service_fn(echo));

        let response = service
            .oneshot(Request::post("/").body(Body::from("abcdef")).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn dropped_body_still_emits_record() {
        let sink = MemorySink::new();
        let service = layer(&sink, CaptureLimits::default()).layer(service_fn(echo));

        let response = service
            .oneshot(Request::post("/").body(Body::from("abcdef")).unwrap())
            .await
            .unwrap();
        drop(response);

        let exchange = &sink.exchanges()[0];
        assert!(!exchange.response_complete);
        assert!(exchange.response_body.is_empty());
    }
}

//! Capture middleware observed through the assembled router.

use axum::http::StatusCode;
use tower::ServiceExt;

mod common;
use common::{body_bytes, empty_request, json_request, memory_app};

#[tokio::test]
async fn captured_bodies_match_the_wire() {
    let (app, sink) = memory_app();
    let request_body = r#"{"id":"b1","title":"The Vortex","author":"Hay"}"#;

    let response = app
        .oneshot(json_request("POST", "/api/books", request_body))
        .await
        .unwrap();
    let status = response.status();
    let sent = body_bytes(response).await;

    let exchanges = sink.exchanges();
    assert_eq!(exchanges.len(), 1);
    let exchange = &exchanges[0];
    assert_eq!(exchange.method, "POST");
    assert_eq!(exchange.path, "/api/books");
    assert_eq!(exchange.request_body.as_ref(), request_body.as_bytes());
    assert_eq!(exchange.status, Some(status));
    assert_eq!(exchange.response_body.as_ref(), sent.as_slice());
    assert!(exchange.response_complete);
    assert!(!exchange.response_truncated);
}

#[tokio::test]
async fn rejected_bodies_are_still_logged() {
    let (app, sink) = memory_app();
    let response = app
        .oneshot(json_request("POST", "/api/books", "{oops"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let sent = body_bytes(response).await;

    let exchange = &sink.exchanges()[0];
    assert_eq!(exchange.request_body.as_ref(), b"{oops");
    assert_eq!(exchange.status, Some(StatusCode::BAD_REQUEST));
    assert_eq!(exchange.response_body.as_ref(), sent.as_slice());
}

#[tokio::test]
async fn one_block_per_request() {
    let (app, sink) = memory_app();
    for _ in 0..3 {
        let response = app
            .clone()
            .oneshot(empty_request("GET", "/api/books"))
            .await
            .unwrap();
        body_bytes(response).await;
    }
    assert_eq!(sink.len(), 3);
}

#[tokio::test]
async fn block_renders_status_and_bodies() {
    let (app, sink) = memory_app();
    let response = app
        .oneshot(empty_request("DELETE", "/api/books/missing"))
        .await
        .unwrap();
    body_bytes(response).await;

    let block = sink.exchanges()[0].to_string();
    assert!(block.contains("DELETE /api/books/missing"));
    assert!(block.contains("→ 404 Not Found"));
    assert!(block.contains(r#"{"error":"Book not found"}"#));
}

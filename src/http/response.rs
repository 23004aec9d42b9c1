//! Error responses.
//!
//! # Responsibilities
//! - Map each [`BookError`] to its fixed status code and client message
//! - Keep store error text out of responses (it is logged instead)
//!
//! Every error body has the shape `{"error": "<message>"}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::books::BookError;

pub const MSG_INVALID_BODY: &str = "Invalid request body";
pub const MSG_INVALID_ID: &str = "Invalid book id";
pub const MSG_MISSING_FIELDS: &str = "Missing required fields: id, title, and author are mandatory";
pub const MSG_DUPLICATE: &str = "A book with this ID already exists";
pub const MSG_NOT_FOUND: &str = "Book not found";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    status: StatusCode,
    message: &'static str,
}

impl ApiError {
    pub const fn new(status: StatusCode, message: &'static str) -> Self {
        Self { status, message }
    }

    pub const fn invalid_body() -> Self {
        Self::new(StatusCode::BAD_REQUEST, MSG_INVALID_BODY)
    }

    pub const fn invalid_id() -> Self {
        Self::new(StatusCode::BAD_REQUEST, MSG_INVALID_ID)
    }

    pub const fn payload_too_large() -> Self {
        Self::new(StatusCode::PAYLOAD_TOO_LARGE, "Request body too large")
    }

    pub const fn render_failed() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Failed to render view")
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &'static str {
        self.message
    }
}

fn store_message(operation: &str) -> &'static str {
    match operation {
        "count" => "Failed to check for existing book",
        "insert_one" => "Failed to create book",
        "find_all" => "Failed to fetch books",
        "replace_one" => "Failed to update book",
        "delete_one" => "Failed to delete book",
        _ => "Database error",
    }
}

impl From<BookError> for ApiError {
    fn from(err: BookError) -> Self {
        match err {
            BookError::Validation { .. } => Self::new(StatusCode::BAD_REQUEST, MSG_MISSING_FIELDS),
            BookError::Conflict { .. } => Self::new(StatusCode::CONFLICT, MSG_DUPLICATE),
            BookError::NotFound { .. } => Self::new(StatusCode::NOT_FOUND, MSG_NOT_FOUND),
            BookError::Store { operation, source } => {
                tracing::error!(operation, error = %source, "Store operation failed");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, store_message(operation))
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreError;

    #[test]
    fn taxonomy_maps_to_fixed_statuses() {
        let cases = [
            (BookError::Validation { missing: "id".into() }, StatusCode::BAD_REQUEST),
            (BookError::Conflict { id: "b1".into() }, StatusCode::CONFLICT),
            (BookError::NotFound { id: "b1".into() }, StatusCode::NOT_FOUND),
            (
                BookError::Store {
                    operation: "insert_one",
                    source: StoreError::Backend("socket closed".into()),
                },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status(), status);
        }
    }

    #[test]
    fn store_text_is_not_exposed() {
        let err = ApiError::from(BookError::Store {
            operation: "delete_one",
            source: StoreError::Connection("10.0.0.7:27017 refused".into()),
        });
        assert_eq!(err.message(), "Failed to delete book");
    }
}

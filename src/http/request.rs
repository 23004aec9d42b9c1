//! Request extraction.
//!
//! # Responsibilities
//! - Parse POST/PUT bodies as flat string-valued JSON objects
//! - Turn every parse failure into the fixed 400 response
//! - Extract the book id from the path with the same JSON error shape
//!
//! Unknown keys are kept in the map and ignored by the book operations.

use axum::extract::{FromRequest, FromRequestParts, Path, Request};
use axum::http::request::Parts;
use axum::Json;

use crate::books::BookFields;
use crate::http::response::ApiError;

/// Header carrying the per-request correlation id.
pub const X_REQUEST_ID: &str = "x-request-id";

/// External id taken from `/api/books/{id}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookId(pub String);

impl<S> FromRequestParts<S> for BookId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<String>::from_request_parts(parts, state).await {
            Ok(Path(id)) => Ok(Self(id)),
            Err(rejection) => {
                tracing::debug!(error = %rejection, "Rejected book id");
                Err(ApiError::invalid_id())
            }
        }
    }
}

/// Book request body.
#[derive(Debug, Clone, Default)]
pub struct BookPayload(pub BookFields);

impl<S> FromRequest<S> for BookPayload
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<BookFields>::from_request(req, state).await {
            Ok(Json(fields)) => Ok(Self(fields)),
            Err(rejection) => {
                tracing::debug!(error = %rejection, "Rejected request body");
                Err(ApiError::invalid_body())
            }
        }
    }
}

//! JSON API handlers for `/api/books`.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use crate::books::BookRecord;
use crate::http::request::{BookId, BookPayload};
use crate::http::response::ApiError;
use crate::http::server::AppState;

pub async fn list_books(State(state): State<AppState>) -> Result<Json<Vec<BookRecord>>, ApiError> {
    let books = state.books.read_all().await?;
    Ok(Json(books))
}

pub async fn create_book(
    State(state): State<AppState>,
    BookPayload(fields): BookPayload,
) -> Result<(StatusCode, Json<BookRecord>), ApiError> {
    let record = state.books.create(&fields).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// Sparse update. Success is 200 with an empty body.
pub async fn update_book(
    State(state): State<AppState>,
    BookId(id): BookId,
    BookPayload(fields): BookPayload,
) -> Result<StatusCode, ApiError> {
    state.books.update(&id, &fields).await?;
    Ok(StatusCode::OK)
}

pub async fn delete_book(
    State(state): State<AppState>,
    BookId(id): BookId,
) -> Result<StatusCode, ApiError> {
    state.books.delete(&id).await?;
    Ok(StatusCode::OK)
}

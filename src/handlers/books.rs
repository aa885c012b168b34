//! Book CRUD handlers. Each one only picks the status code and envelope for its
//! operation; everything else is the service's job.

use crate::extractors::{BookIdParam, FoundBook};
use crate::model::BookPayload;
use crate::openapi::{BookEnvelope, BookListEnvelope, DeletedBookEnvelope};
use crate::response::{success_created, success_ok, FailBody, Failure};
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, rejection::PathRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::Value;

/// Oversized bodies keep their 413; every other unreadable body is a 400.
fn body_failure(e: JsonRejection) -> Failure {
    let status = match e.status() {
        StatusCode::PAYLOAD_TOO_LARGE => StatusCode::PAYLOAD_TOO_LARGE,
        _ => StatusCode::BAD_REQUEST,
    };
    Failure::new(status, e.body_text())
}

#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    request_body = BookPayload,
    responses(
        (status = 201, description = "Book created", body = BookEnvelope),
        (status = 400, description = "Invalid body or validation failure", body = FailBody)
    )
)]
pub async fn create_book(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, Failure> {
    let Json(raw) = body.map_err(body_failure)?;
    let book = state.books.create_book(raw).await.map_err(Failure::bad_request)?;
    Ok(success_created(book))
}

#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    responses(
        (status = 200, description = "All books, oldest first", body = BookListEnvelope),
        (status = 500, description = "Store failure", body = FailBody)
    )
)]
pub async fn get_all_books(State(state): State<AppState>) -> Result<impl IntoResponse, Failure> {
    let books = state.books.get_all_books().await.map_err(Failure::internal)?;
    Ok(success_ok(books))
}

#[utoipa::path(
    get,
    path = "/books/{bookId}",
    tag = "books",
    params(("bookId" = String, Path, description = "Book id")),
    responses(
        (status = 200, description = "The book", body = BookEnvelope),
        (status = 404, description = "No book with this id", body = FailBody),
        (status = 500, description = "Store failure", body = FailBody)
    )
)]
pub async fn get_book_by_id(FoundBook(book): FoundBook) -> impl IntoResponse {
    success_ok(book)
}

#[utoipa::path(
    put,
    path = "/books/{bookId}",
    tag = "books",
    params(("bookId" = String, Path, description = "Book id")),
    request_body = BookPayload,
    responses(
        (status = 200, description = "Updated book", body = BookEnvelope),
        (status = 400, description = "Invalid body or validation failure", body = FailBody),
        (status = 404, description = "No book with this id", body = FailBody)
    )
)]
pub async fn update_book_by_id(
    State(state): State<AppState>,
    FoundBook(existing): FoundBook,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, Failure> {
    let Json(raw) = body.map_err(body_failure)?;
    let id = existing.id.to_string();
    match state.books.update_book_by_id(&id, raw).await {
        Ok(Some(book)) => Ok(success_ok(book)),
        Ok(None) => Err(Failure::new(
            StatusCode::NOT_FOUND,
            format!("bookId '{}' not found.", id),
        )),
        Err(e) => Err(Failure::bad_request(e)),
    }
}

#[utoipa::path(
    delete,
    path = "/books/{bookId}",
    tag = "books",
    params(("bookId" = String, Path, description = "Book id")),
    responses(
        (status = 200, description = "Deleted book, or `data: null` when there was none", body = DeletedBookEnvelope),
        (status = 500, description = "Store failure", body = FailBody)
    )
)]
pub async fn delete_book_by_id(
    State(state): State<AppState>,
    param: Result<Path<BookIdParam>, PathRejection>,
) -> Result<impl IntoResponse, Failure> {
    let Path(param) = param.map_err(|e| Failure::bad_request(e.body_text()))?;
    let book = state
        .books
        .delete_book_by_id(&param.book_id)
        .await
        .map_err(Failure::internal)?;
    Ok(success_ok(book))
}

//! Resolve the `bookId` path parameter to a stored book before the handler runs.

use crate::error::AppError;
use crate::model::Book;
use crate::state::AppState;
use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct BookIdParam {
    #[serde(rename = "bookId")]
    pub book_id: String,
}

/// The book named by `bookId`. Rejects with 404 when no such record exists and
/// with the store error otherwise.
#[derive(Clone, Debug)]
pub struct FoundBook(pub Book);

#[async_trait]
impl FromRequestParts<AppState> for FoundBook {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Path(param) = Path::<BookIdParam>::from_request_parts(parts, state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        match state.books.get_book_by_id(&param.book_id).await? {
            Some(book) => Ok(FoundBook(book)),
            None => Err(AppError::NotFound(format!(
                "bookId '{}' not found.",
                param.book_id
            ))),
        }
    }
}

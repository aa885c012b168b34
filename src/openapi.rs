//! OpenAPI document served at `/api-docs/openapi.json`.

use crate::handlers::{books, common::VersionInfo};
use crate::model::{Book, BookPayload};
use crate::response::{FailBody, StatusBody};
use serde::Serialize;
use utoipa::{OpenApi, ToSchema};

/// `{status: "success", data: Book}`
#[derive(Serialize, ToSchema)]
pub struct BookEnvelope {
    pub status: String,
    pub data: Book,
}

/// `{status: "success", data: [Book]}`
#[derive(Serialize, ToSchema)]
pub struct BookListEnvelope {
    pub status: String,
    pub data: Vec<Book>,
}

/// Delete result; `data` is `null` when no book had the id.
#[derive(Serialize, ToSchema)]
pub struct DeletedBookEnvelope {
    pub status: String,
    pub data: Option<Book>,
}

#[derive(OpenApi)]
#[openapi(
    info(title = "Bookshelf API", description = "CRUD over book records"),
    paths(
        books::create_book,
        books::get_all_books,
        books::get_book_by_id,
        books::update_book_by_id,
        books::delete_book_by_id,
    ),
    components(schemas(
        Book,
        BookPayload,
        BookEnvelope,
        BookListEnvelope,
        DeletedBookEnvelope,
        FailBody,
        StatusBody,
        VersionInfo
    )),
    tags((name = "books", description = "Book records; also mounted under /api/v1"))
)]
pub struct ApiDoc;

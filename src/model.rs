//! Book record types: the stored entity, its JSONB document body, and the whitelisted request payload.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

/// A stored book as returned to clients.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub title: String,
    pub authors: Vec<String>,
    pub isbn: String,
    pub publisher: String,
    pub publication_date: DateTime<Utc>,
    pub edition: String,
    pub pages: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Content fields of a book, as persisted in the `document` column.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookDocument {
    pub title: String,
    pub authors: Vec<String>,
    pub pages: i64,
    pub isbn: String,
    pub publisher: String,
    pub publication_date: DateTime<Utc>,
    pub edition: String,
}

impl Book {
    pub fn from_document(
        id: Uuid,
        doc: BookDocument,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Book {
            id,
            title: doc.title,
            authors: doc.authors,
            isbn: doc.isbn,
            publisher: doc.publisher,
            publication_date: doc.publication_date,
            edition: doc.edition,
            pages: doc.pages,
            created_at,
            updated_at,
        }
    }

    pub fn document(&self) -> BookDocument {
        BookDocument {
            title: self.title.clone(),
            authors: self.authors.clone(),
            pages: self.pages,
            isbn: self.isbn.clone(),
            publisher: self.publisher.clone(),
            publication_date: self.publication_date,
            edition: self.edition.clone(),
        }
    }
}

/// Writable book fields taken from a request body. Any other key is dropped on
/// deserialization. Values stay raw until the schema casts them; `null` reads as absent.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookPayload {
    pub title: Option<Value>,
    pub authors: Option<Value>,
    pub pages: Option<Value>,
    pub isbn: Option<Value>,
    pub publisher: Option<Value>,
    pub publication_date: Option<Value>,
    pub edition: Option<Value>,
}

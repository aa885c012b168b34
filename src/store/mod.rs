//! Book persistence. [`BookStore`] is the only path to stored records; missing
//! records come back as `None`, never as an error.

mod memory;
mod postgres;

pub use memory::MemoryBookStore;
pub use postgres::{ensure_books_table, ensure_database_exists, Database, PgBookStore, BOOKS_TABLE};

use crate::error::AppError;
use crate::model::{Book, BookPayload};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

#[async_trait]
pub trait BookStore: Send + Sync {
    /// Apply creation defaults, validate, persist. `now` stamps `createdAt` and `updatedAt`.
    async fn create(&self, payload: &BookPayload, now: DateTime<Utc>) -> Result<Book, AppError>;

    /// Every record, oldest first.
    async fn find_all(&self) -> Result<Vec<Book>, AppError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Book>, AppError>;

    /// Merge the provided fields into the stored record, revalidate, persist.
    /// Nothing is written when validation fails.
    async fn update_by_id(
        &self,
        id: &str,
        payload: &BookPayload,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Book>, AppError>;

    /// Remove the record and return it.
    async fn delete_by_id(&self, id: &str) -> Result<Option<Book>, AppError>;

    async fn ping(&self) -> Result<(), AppError>;
}

/// Ids are UUIDs; any other string cannot match a record.
pub fn parse_id(id: &str) -> Option<Uuid> {
    Uuid::parse_str(id).ok()
}

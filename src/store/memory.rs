//! In-process book store. Records live in insertion order behind a lock; used
//! with `STORE_BACKEND=memory` and by the test suites.

use super::{parse_id, BookStore};
use crate::error::AppError;
use crate::model::{Book, BookPayload};
use crate::schema;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

#[derive(Default)]
pub struct MemoryBookStore {
    books: RwLock<Vec<Book>>,
}

impl MemoryBookStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Vec<Book>>, AppError> {
        self.books.read().map_err(|e| AppError::Lock(e.to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Vec<Book>>, AppError> {
        self.books.write().map_err(|e| AppError::Lock(e.to_string()))
    }
}

#[async_trait]
impl BookStore for MemoryBookStore {
    async fn create(&self, payload: &BookPayload, now: DateTime<Utc>) -> Result<Book, AppError> {
        let doc = schema::prepare_new(payload, now)?;
        let book = Book::from_document(Uuid::new_v4(), doc, now, now);
        self.write()?.push(book.clone());
        Ok(book)
    }

    async fn find_all(&self) -> Result<Vec<Book>, AppError> {
        Ok(self.read()?.clone())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Book>, AppError> {
        let Some(id) = parse_id(id) else {
            return Ok(None);
        };
        Ok(self.read()?.iter().find(|b| b.id == id).cloned())
    }

    async fn update_by_id(
        &self,
        id: &str,
        payload: &BookPayload,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Book>, AppError> {
        let Some(id) = parse_id(id) else {
            return Ok(None);
        };
        let mut books = self.write()?;
        let Some(slot) = books.iter_mut().find(|b| b.id == id) else {
            return Ok(None);
        };
        let merged = schema::prepare_update(slot, payload, updated_at)?;
        *slot = merged.clone();
        Ok(Some(merged))
    }

    async fn delete_by_id(&self, id: &str) -> Result<Option<Book>, AppError> {
        let Some(id) = parse_id(id) else {
            return Ok(None);
        };
        let mut books = self.write()?;
        Ok(books
            .iter()
            .position(|b| b.id == id)
            .map(|i| books.remove(i)))
    }

    async fn ping(&self) -> Result<(), AppError> {
        self.read().map(|_| ())
    }
}

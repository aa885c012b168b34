use crate::error::AppError;
use crate::model::{Book, BookPayload};
use crate::schema;
use crate::store::BookStore;
use chrono::{DateTime, SubsecRound, Utc};
use serde_json::Value;
use std::sync::Arc;

/// Current instant at the millisecond precision records are stored with.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Keep only the writable book fields of a request body. Unknown keys, including
/// `_id`, `createdAt` and `updatedAt`, are dropped.
pub fn from_payload(raw: Value) -> Result<BookPayload, AppError> {
    if !raw.is_object() {
        return Err(AppError::BadRequest("body must be a JSON object".into()));
    }
    Ok(serde_json::from_value(raw)?)
}

#[derive(Clone)]
pub struct BookService {
    store: Arc<dyn BookStore>,
}

impl BookService {
    pub fn new(store: Arc<dyn BookStore>) -> Self {
        BookService { store }
    }

    /// Run the create-time checks without persisting anything.
    pub fn validate_payload(&self, raw: Value) -> Result<(), AppError> {
        let payload = from_payload(raw)?;
        schema::prepare_new(&payload, now())?;
        Ok(())
    }

    pub async fn create_book(&self, raw: Value) -> Result<Book, AppError> {
        let payload = from_payload(raw)?;
        let book = self.store.create(&payload, now()).await?;
        tracing::debug!(id = %book.id, "book created");
        Ok(book)
    }

    pub async fn get_all_books(&self) -> Result<Vec<Book>, AppError> {
        self.store.find_all().await
    }

    pub async fn get_book_by_id(&self, id: &str) -> Result<Option<Book>, AppError> {
        self.store.find_by_id(id).await
    }

    pub async fn update_book_by_id(&self, id: &str, raw: Value) -> Result<Option<Book>, AppError> {
        let payload = from_payload(raw)?;
        let book = self.store.update_by_id(id, &payload, now()).await?;
        tracing::debug!(id, found = book.is_some(), "book update");
        Ok(book)
    }

    pub async fn delete_book_by_id(&self, id: &str) -> Result<Option<Book>, AppError> {
        let book = self.store.delete_by_id(id).await?;
        tracing::debug!(id, found = book.is_some(), "book delete");
        Ok(book)
    }

    /// Readiness probe against the store.
    pub async fn ping(&self) -> Result<(), AppError> {
        self.store.ping().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryBookStore;
    use serde_json::json;

    fn service() -> BookService {
        BookService::new(Arc::new(MemoryBookStore::new()))
    }

    #[test]
    fn whitelist_drops_unknown_keys() {
        let payload = from_payload(json!({
            "_id": "abc",
            "createdAt": "2000-01-01T00:00:00Z",
            "owner": "someone",
            "title": "Dune"
        }))
        .unwrap();
        assert_eq!(payload.title, Some(json!("Dune")));
        assert_eq!(
            payload,
            BookPayload {
                title: Some(json!("Dune")),
                ..BookPayload::default()
            }
        );
    }

    #[test]
    fn non_object_body_is_rejected() {
        assert!(matches!(from_payload(json!([1, 2])), Err(AppError::BadRequest(_))));
        assert!(matches!(from_payload(json!("title")), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn now_has_millisecond_precision() {
        assert_eq!(now().timestamp_subsec_nanos() % 1_000_000, 0);
    }

    #[test]
    fn validate_payload_persists_nothing() {
        let svc = service();
        assert!(svc.validate_payload(json!({"title": "t", "authors": ["a"]})).is_ok());
        assert!(matches!(
            svc.validate_payload(json!({"title": ""})),
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn created_book_round_trips() {
        let svc = service();
        let created = svc
            .create_book(json!({"title": "Algorithms", "authors": ["Robert Sedgewick"], "pages": 976}))
            .await
            .unwrap();
        let fetched = svc.get_book_by_id(&created.id.to_string()).await.unwrap();
        assert_eq!(fetched, Some(created.clone()));
        assert_eq!(svc.get_all_books().await.unwrap(), vec![created]);
    }

    #[tokio::test]
    async fn client_supplied_id_and_timestamps_are_ignored() {
        let svc = service();
        let forced = uuid::Uuid::new_v4();
        let created = svc
            .create_book(json!({
                "_id": forced.to_string(),
                "title": "t",
                "authors": ["a"],
                "createdAt": "1999-01-01T00:00:00Z"
            }))
            .await
            .unwrap();
        assert_ne!(created.id, forced);
        assert!(created.created_at.timestamp() > 946_684_800);
    }

    #[tokio::test]
    async fn update_with_only_protected_keys_changes_nothing_else() {
        let svc = service();
        let created = svc.create_book(json!({"title": "t", "authors": ["a"]})).await.unwrap();
        let id = created.id.to_string();
        let updated = svc
            .update_book_by_id(&id, json!({"_id": "x", "createdAt": "2000-01-01T00:00:00Z", "updatedAt": "2000-01-01T00:00:00Z"}))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.created_at, created.created_at);
        assert_eq!(updated.document(), created.document());
        assert!(updated.updated_at >= created.updated_at);
    }

    #[tokio::test]
    async fn missing_records_are_absent_not_errors() {
        let svc = service();
        assert_eq!(svc.get_book_by_id("nope").await.unwrap(), None);
        assert_eq!(svc.update_book_by_id("nope", json!({"title": "x"})).await.unwrap(), None);
        assert_eq!(svc.delete_book_by_id(&uuid::Uuid::new_v4().to_string()).await.unwrap(), None);
        assert!(svc.ping().await.is_ok());
    }
}

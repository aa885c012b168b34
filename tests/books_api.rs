//! HTTP scenarios against the full router backed by the in-memory store.

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use bookshelf_api::{app, AppError, AppState, Book, BookPayload, BookStore, MemoryBookStore};
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

const LIMIT: usize = 1024 * 1024;

fn memory_app() -> Router {
    app(AppState::new(Arc::new(MemoryBookStore::new())), LIMIT)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let (status, bytes) = send_raw(app, method, uri, body.map(|b| b.to_string())).await;
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

async fn send_raw(app: &Router, method: Method, uri: &str, body: Option<String>) -> (StatusCode, Vec<u8>) {
    let mut req = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(b) => {
            req = req.header(header::CONTENT_TYPE, "application/json");
            Body::from(b)
        }
        None => Body::empty(),
    };
    let res = app.clone().oneshot(req.body(body).unwrap()).await.unwrap();
    let status = res.status();
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    (status, bytes.to_vec())
}

async fn create(app: &Router, body: Value) -> Value {
    let (status, res) = send(app, Method::POST, "/books", Some(body)).await;
    assert_eq!(status, StatusCode::CREATED, "{res}");
    res["data"].clone()
}

#[tokio::test]
async fn create_returns_the_new_book() {
    let app = memory_app();
    let (status, res) = send(
        &app,
        Method::POST,
        "/books",
        Some(json!({"title": "Algorithms", "authors": ["Robert Sedgewick"], "pages": 976})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(res["status"], "success");
    let data = &res["data"];
    assert_eq!(data["title"], "Algorithms");
    assert_eq!(data["authors"].as_array().unwrap().len(), 1);
    assert_eq!(data["pages"], 976);
    assert!(data["_id"].is_string());
    assert_eq!(data["isbn"], "");
    assert_eq!(data["createdAt"], data["updatedAt"]);
}

#[tokio::test]
async fn create_accepts_every_alias() {
    let app = memory_app();
    for uri in ["/books", "/api/v1/books", "/book"] {
        let (status, _) = send(&app, Method::POST, uri, Some(json!({"title": "t", "authors": ["a"]}))).await;
        assert_eq!(status, StatusCode::CREATED, "{uri}");
    }
    let (_, res) = send(&app, Method::GET, "/api/v1/books", None).await;
    assert_eq!(res["data"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn invalid_create_names_both_fields() {
    let app = memory_app();
    let (status, res) = send(&app, Method::POST, "/books", Some(json!({"title": "", "authors": []}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(res["status"], "fail");
    let message = res["message"].as_str().unwrap();
    assert!(message.contains("title: Path `title` is required."), "{message}");
    assert!(message.contains("authors: Path `authors` should have at least one element."), "{message}");
}

#[tokio::test]
async fn malformed_bodies_are_bad_requests() {
    let app = memory_app();
    let (status, bytes) = send_raw(&app, Method::POST, "/books", Some("{not json".into())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let res: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(res["status"], "fail");

    let (status, res) = send(&app, Method::POST, "/books", Some(json!(["title"]))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(res["message"], "bad request: body must be a JSON object");

    let req = Request::builder()
        .method(Method::POST)
        .uri("/books")
        .header(header::CONTENT_TYPE, "text/plain")
        .body(Body::from("title=x"))
        .unwrap();
    let res = app.clone().oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn oversized_bodies_are_rejected() {
    let app = app(AppState::new(Arc::new(MemoryBookStore::new())), 64);
    let big = json!({"title": "x".repeat(200), "authors": ["a"]}).to_string();

    let (status, bytes) = send_raw(&app, Method::POST, "/books", Some(big.clone())).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    let res: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(res["status"], "fail");

    let req = Request::builder()
        .method(Method::POST)
        .uri("/books")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::CONTENT_LENGTH, big.len())
        .body(Body::from(big))
        .unwrap();
    let res = app.clone().oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::PAYLOAD_TOO_LARGE);
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let res: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(res["status"], "fail");
    assert!(res["message"].is_string());
}

#[tokio::test]
async fn list_and_get_return_stored_books() {
    let app = memory_app();
    let (status, res) = send(&app, Method::GET, "/books", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(res, json!({"status": "success", "data": []}));

    let first = create(&app, json!({"title": "Dune", "authors": ["Frank Herbert"]})).await;
    let second = create(&app, json!({"title": "Emma", "authors": ["Jane Austen"]})).await;
    let (_, res) = send(&app, Method::GET, "/books", None).await;
    assert_eq!(res["data"], json!([first.clone(), second]));

    let id = first["_id"].as_str().unwrap();
    for prefix in ["", "/api/v1"] {
        let (status, res) = send(&app, Method::GET, &format!("{prefix}/books/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(res["data"], first);
    }
}

#[tokio::test]
async fn unknown_id_is_not_found() {
    let app = memory_app();
    for id in [uuid::Uuid::new_v4().to_string(), "not-an-id".to_string()] {
        let (status, res) = send(&app, Method::GET, &format!("/books/{id}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(
            res,
            json!({"status": "fail", "message": format!("bookId '{id}' not found.")})
        );
        let (status, _) = send(&app, Method::PUT, &format!("/books/{id}"), Some(json!({"title": "x"}))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}

#[tokio::test]
async fn update_keeps_identity_and_advances_updated_at() {
    let app = memory_app();
    let created = create(&app, json!({"title": "Old", "authors": ["A"], "pages": 10})).await;
    let id = created["_id"].as_str().unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;

    let (status, res) = send(
        &app,
        Method::PUT,
        &format!("/books/{id}"),
        Some(json!({"title": "New", "_id": "forged", "createdAt": "2000-01-01T00:00:00Z"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let updated: Book = serde_json::from_value(res["data"].clone()).unwrap();
    let before: Book = serde_json::from_value(created.clone()).unwrap();
    assert_eq!(updated.id, before.id);
    assert_eq!(updated.title, "New");
    assert_eq!(updated.pages, 10);
    assert_eq!(updated.created_at, before.created_at);
    assert!(updated.updated_at > before.updated_at);
}

#[tokio::test]
async fn failed_update_is_a_bad_request_and_keeps_the_record() {
    let app = memory_app();
    let created = create(&app, json!({"title": "Keep", "authors": ["A"]})).await;
    let id = created["_id"].as_str().unwrap();
    let (status, res) = send(&app, Method::PUT, &format!("/books/{id}"), Some(json!({"authors": []}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(res["message"].as_str().unwrap().contains("authors"));
    let (_, res) = send(&app, Method::GET, &format!("/books/{id}"), None).await;
    assert_eq!(res["data"], created);
}

#[tokio::test]
async fn delete_returns_the_book_then_null() {
    let app = memory_app();
    let created = create(&app, json!({"title": "Gone", "authors": ["A"]})).await;
    let id = created["_id"].as_str().unwrap();
    let (status, res) = send(&app, Method::DELETE, &format!("/books/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(res["data"], created);

    let (status, res) = send(&app, Method::DELETE, &format!("/api/v1/books/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(res, json!({"status": "success", "data": null}));

    let (status, _) = send(&app, Method::GET, &format!("/books/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_of_malformed_id_is_null() {
    let app = memory_app();
    create(&app, json!({"title": "Stays", "authors": ["A"]})).await;
    let (status, res) = send(&app, Method::DELETE, "/books/not-an-id", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(res, json!({"status": "success", "data": null}));
    let (_, res) = send(&app, Method::GET, "/books", None).await;
    assert_eq!(res["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn service_endpoints() {
    let app = memory_app();
    let (status, res) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(res, json!({"status": "success"}));

    let (status, bytes) = send_raw(&app, Method::GET, "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(String::from_utf8(bytes).unwrap(), "<h1>Hello World!</h1>");

    let (status, res) = send(&app, Method::GET, "/ready", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(res, json!({"status": "success"}));

    let (_, res) = send(&app, Method::GET, "/version", None).await;
    assert_eq!(res["data"]["name"], "bookshelf-api");

    let (status, res) = send(&app, Method::GET, "/api-docs/openapi.json", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(res["paths"]["/books"].is_object());
    assert!(res["paths"]["/books/{bookId}"].is_object());
    assert_eq!(
        res["paths"]["/books/{bookId}"]["delete"]["responses"]["200"]["content"]["application/json"]["schema"]["$ref"],
        "#/components/schemas/DeletedBookEnvelope"
    );
    let deleted = &res["components"]["schemas"]["DeletedBookEnvelope"];
    assert!(deleted["properties"]["data"].is_object());
}

#[tokio::test]
async fn unmatched_routes_fall_back_to_not_found() {
    let app = memory_app();
    let (status, res) = send(&app, Method::GET, "/shelves", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(res, json!({"status": "fail", "message": "Cannot GET /shelves"}));
}

/// Store whose every operation fails.
struct BrokenStore;

fn broken() -> AppError {
    AppError::Lock("store offline".into())
}

#[async_trait]
impl BookStore for BrokenStore {
    async fn create(&self, _: &BookPayload, _: DateTime<Utc>) -> Result<Book, AppError> {
        Err(broken())
    }
    async fn find_all(&self) -> Result<Vec<Book>, AppError> {
        Err(broken())
    }
    async fn find_by_id(&self, _: &str) -> Result<Option<Book>, AppError> {
        Err(broken())
    }
    async fn update_by_id(&self, _: &str, _: &BookPayload, _: DateTime<Utc>) -> Result<Option<Book>, AppError> {
        Err(broken())
    }
    async fn delete_by_id(&self, _: &str) -> Result<Option<Book>, AppError> {
        Err(broken())
    }
    async fn ping(&self) -> Result<(), AppError> {
        Err(broken())
    }
}

#[tokio::test]
async fn store_failures_use_each_operations_status() {
    let app = app(AppState::new(Arc::new(BrokenStore)), LIMIT);
    let id = uuid::Uuid::new_v4();

    let (status, res) = send(&app, Method::POST, "/books", Some(json!({"title": "t", "authors": ["a"]}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(res["message"], "store lock poisoned: store offline");

    let (status, _) = send(&app, Method::GET, "/books", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let (status, res) = send(&app, Method::GET, &format!("/books/{id}"), None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(res["status"], "fail");

    let (status, _) = send(&app, Method::DELETE, &format!("/books/{id}"), None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let (status, res) = send(&app, Method::GET, "/ready", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(res["status"], "fail");
}

/// Store whose listing panics.
struct PanickingStore;

#[async_trait]
impl BookStore for PanickingStore {
    async fn create(&self, _: &BookPayload, _: DateTime<Utc>) -> Result<Book, AppError> {
        Err(broken())
    }
    async fn find_all(&self) -> Result<Vec<Book>, AppError> {
        panic!("listing exploded")
    }
    async fn find_by_id(&self, _: &str) -> Result<Option<Book>, AppError> {
        Ok(None)
    }
    async fn update_by_id(&self, _: &str, _: &BookPayload, _: DateTime<Utc>) -> Result<Option<Book>, AppError> {
        Ok(None)
    }
    async fn delete_by_id(&self, _: &str) -> Result<Option<Book>, AppError> {
        Ok(None)
    }
    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}

#[tokio::test]
async fn panics_become_a_fail_envelope() {
    let app = app(AppState::new(Arc::new(PanickingStore)), LIMIT);
    let (status, res) = send(&app, Method::GET, "/books", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(res, json!({"status": "fail", "message": "internal server error"}));

    let (status, _) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
}

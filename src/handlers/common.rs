//! Service endpoints: greeting page, health, readiness, version, API document,
//! and the responses for unmatched routes and panics.

use crate::error::AppError;
use crate::openapi::ApiDoc;
use crate::response::{fail, status_only, success_ok, Failure, STATUS_SUCCESS};
use crate::state::AppState;
use axum::{
    extract::State,
    http::{Method, StatusCode, Uri},
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::any::Any;
use utoipa::{OpenApi, ToSchema};

#[derive(Debug, Serialize, ToSchema)]
pub struct VersionInfo {
    pub name: String,
    pub version: String,
}

pub async fn hello() -> Html<&'static str> {
    Html("<h1>Hello World!</h1>")
}

pub async fn health() -> impl IntoResponse {
    status_only(StatusCode::OK, STATUS_SUCCESS)
}

/// 200 when the store answers, 503 otherwise.
pub async fn ready(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    state
        .books
        .ping()
        .await
        .map_err(|e| AppError::Unavailable(e.to_string()))?;
    Ok(status_only(StatusCode::OK, STATUS_SUCCESS))
}

pub async fn version() -> impl IntoResponse {
    success_ok(VersionInfo {
        name: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

pub async fn not_found(method: Method, uri: Uri) -> Failure {
    Failure::new(
        StatusCode::NOT_FOUND,
        format!("Cannot {} {}", method, uri.path()),
    )
}

pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    tracing::error!(panic = %detail, "handler panicked");
    fail(StatusCode::INTERNAL_SERVER_ERROR, "internal server error".into()).into_response()
}

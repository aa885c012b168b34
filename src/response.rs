//! Standard response envelope helpers: `{status, data}` on success, `{status, message}` on failure.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::fmt::Display;
use utoipa::ToSchema;

pub const STATUS_SUCCESS: &str = "success";
pub const STATUS_FAIL: &str = "fail";

#[derive(Serialize)]
pub struct Success<T> {
    pub status: &'static str,
    /// Always serialized, so `Option::None` renders as `null`.
    pub data: T,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FailBody {
    /// Always `"fail"`.
    pub status: String,
    pub message: String,
}

/// Status-only body, as returned by `/health`.
#[derive(Debug, Serialize, ToSchema)]
pub struct StatusBody {
    pub status: String,
}

pub fn success<T: Serialize>(status: StatusCode, data: T) -> (StatusCode, Json<Success<T>>) {
    (
        status,
        Json(Success {
            status: STATUS_SUCCESS,
            data,
        }),
    )
}

pub fn success_ok<T: Serialize>(data: T) -> (StatusCode, Json<Success<T>>) {
    success(StatusCode::OK, data)
}

pub fn success_created<T: Serialize>(data: T) -> (StatusCode, Json<Success<T>>) {
    success(StatusCode::CREATED, data)
}

pub fn status_only(status: StatusCode, value: &str) -> (StatusCode, Json<StatusBody>) {
    (
        status,
        Json(StatusBody {
            status: value.to_string(),
        }),
    )
}

pub fn fail(status: StatusCode, message: String) -> (StatusCode, Json<FailBody>) {
    (
        status,
        Json(FailBody {
            status: STATUS_FAIL.to_string(),
            message,
        }),
    )
}

/// A failed operation together with the status its handler assigned to it.
/// The message is the error's display form.
#[derive(Debug)]
pub struct Failure {
    pub status: StatusCode,
    pub message: String,
}

impl Failure {
    pub fn new(status: StatusCode, err: impl Display) -> Self {
        Failure {
            status,
            message: err.to_string(),
        }
    }

    pub fn bad_request(err: impl Display) -> Self {
        Self::new(StatusCode::BAD_REQUEST, err)
    }

    pub fn internal(err: impl Display) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, err)
    }
}

impl IntoResponse for Failure {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = %self.status, message = %self.message, "request failed");
        } else {
            tracing::debug!(status = %self.status, message = %self.message, "request rejected");
        }
        fail(self.status, self.message).into_response()
    }
}

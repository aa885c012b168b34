//! Router assembly.

mod books;
mod common;

pub use books::book_routes;
pub use common::common_routes;

use crate::handlers::{handle_panic, not_found};
use crate::state::AppState;
use axum::{extract::DefaultBodyLimit, Router};
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

/// Full application: book routes, service endpoints and the 404 fallback, wrapped
/// in the body limit, request tracing and panic recovery. Oversized bodies surface
/// as extractor rejections, so they get the fail envelope like any other error.
pub fn app(state: AppState, body_limit: usize) -> Router {
    Router::new()
        .merge(book_routes(state.clone()))
        .merge(common_routes(state))
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::custom(handle_panic))
}

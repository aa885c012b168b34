//! Book CRUD routes, mounted both bare and under `/api/v1`.

use crate::handlers::books::{
    create_book, delete_book_by_id, get_all_books, get_book_by_id, update_book_by_id,
};
use crate::state::AppState;
use axum::{routing::get, routing::post, Router};

pub fn book_routes(state: AppState) -> Router {
    let mut router = Router::new().route("/book", post(create_book));
    for prefix in ["", "/api/v1"] {
        router = router
            .route(&format!("{}/books", prefix), get(get_all_books).post(create_book))
            .route(
                &format!("{}/books/:bookId", prefix),
                get(get_book_by_id).put(update_book_by_id).delete(delete_book_by_id),
            );
    }
    router.with_state(state)
}

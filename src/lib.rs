//! Bookshelf API: REST backend for a collection of book records.

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod model;
pub mod openapi;
pub mod response;
pub mod routes;
pub mod schema;
pub mod service;
pub mod settings;
pub mod state;
pub mod store;
pub mod telemetry;

pub use error::{AppError, ConfigError, FieldError, ValidationError};
pub use model::{Book, BookPayload};
pub use routes::app;
pub use service::BookService;
pub use settings::{Settings, StoreBackend};
pub use state::AppState;
pub use store::{BookStore, Database, MemoryBookStore, PgBookStore};
pub use telemetry::init_tracing;

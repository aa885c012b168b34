//! HTTP handlers for book CRUD and the service endpoints.

pub mod books;
pub mod common;
pub use books::*;
pub use common::*;

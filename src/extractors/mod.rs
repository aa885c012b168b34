//! Request extractors.

mod book;
pub use book::{BookIdParam, FoundBook};

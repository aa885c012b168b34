//! BookService: the only entry point handlers use to reach the store.

mod book;
pub use book::{from_payload, now, BookService};

//! Persistence module split across logical submodules. Every function takes
//! the application's single open connection by reference.

mod authors;
mod books;
mod connection;

pub use authors::{delete_author, fetch_authors, find_author, find_or_create_author};
pub use books::{delete_book, fetch_books, insert_book, update_book};
pub use connection::{ensure_schema, open_catalog, open_in_memory};

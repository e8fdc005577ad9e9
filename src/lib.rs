//! Core library surface for the Library Catalog TUI application.
//!
//! The store (`db`), the form actions (`controller`), and the terminal
//! front-end (`ui`) are exposed separately so the binary and the integration
//! tests reuse the same pieces.
pub mod config;
pub mod controller;
pub mod db;
pub mod error;
pub mod logging;
pub mod models;
pub mod ui;

/// Persistence entry points used at startup.
pub use db::{ensure_schema, open_catalog, open_in_memory};

/// The two domain types that other layers manipulate.
pub use models::{Author, Book};

/// Form state and the recoverable error taxonomy.
pub use controller::{CatalogView, FormFields};
pub use error::{ActionError, FormError, Severity};

/// The interactive application entry point and state container.
pub use ui::{run_app, App};

//! Ratatui front-end: the book form, the author choices, the book table, and
//! the modal dialogs. All state changes go through [`crate::controller`].

mod app;
mod forms;
mod helpers;
mod terminal;

pub use app::App;
pub use terminal::run_app;

//! Domain models that mirror the SQLite schema and get passed between the
//! store, the form controller, and the TUI. They stay plain data holders so
//! the other layers can focus on persistence and presentation.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
/// A named author. Authors are only ever created implicitly when a book
/// references a name that is not in the catalog yet.
pub struct Author {
    /// Primary key from the database.
    pub id: i64,
    /// Exact name as typed. Uniqueness is case-sensitive.
    pub name: String,
}

impl fmt::Display for Author {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// One row of the book list: the `books` table joined to its author so the
/// view never has to resolve ids on its own.
pub struct Book {
    /// Primary key from the database. Read-only everywhere in the UI.
    pub id: i64,
    pub title: String,
    /// Name of the referenced author, already resolved by the join.
    pub author: String,
    /// Publication year. `None` when the form left the field empty.
    pub year: Option<i64>,
}

impl Book {
    /// Year as shown in the table and copied into the form: blank when absent.
    pub fn year_text(&self) -> String {
        self.year.map(|year| year.to_string()).unwrap_or_default()
    }
}

//! Form actions. Each public function here is the handler for one command of
//! the catalog form: it reads the explicit [`FormFields`], validates them,
//! talks to the store, and rebuilds the [`CatalogView`]. Nothing in this
//! module knows about terminals, so the same handlers back both the TUI and
//! the tests.

use anyhow::Result;
use rusqlite::Connection;
use tracing::{debug, info, warn};

use crate::db;
use crate::error::{ActionError, FormError};
use crate::models::{Author, Book};

/// Raw values currently in the form. Everything except `id` is exactly what
/// the user typed; `id` is only ever set by selecting a row.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FormFields {
    pub id: Option<i64>,
    pub title: String,
    pub author: String,
    pub year: String,
}

impl FormFields {
    /// Copy a listed book into the form, identifier included.
    pub fn from_book(book: &Book) -> Self {
        Self {
            id: Some(book.id),
            title: book.title.clone(),
            author: book.author.clone(),
            year: book.year_text(),
        }
    }

    /// Empty every field and drop the selection.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// The two read-only views next to the form: the book rows and the author
/// choices. Both are always rebuilt from scratch.
#[derive(Debug, Default, Clone)]
pub struct CatalogView {
    pub books: Vec<Book>,
    pub authors: Vec<Author>,
}

impl CatalogView {
    pub fn load(conn: &Connection) -> Result<Self> {
        let mut view = Self::default();
        view.refresh(conn)?;
        Ok(view)
    }

    /// Re-read both lists from the database.
    pub fn refresh(&mut self, conn: &Connection) -> Result<()> {
        self.books = db::fetch_books(conn)?;
        self.authors = db::fetch_authors(conn)?;
        debug!(
            books = self.books.len(),
            authors = self.authors.len(),
            "refreshed catalog view"
        );
        Ok(())
    }

    /// Author names in display order, for the suggestion list.
    pub fn author_names(&self) -> Vec<String> {
        self.authors.iter().map(|author| author.name.clone()).collect()
    }
}

/// Turn the year field into a typed value. Blank means "no year"; anything
/// else has to be a whole number. No range check is applied.
pub fn parse_year(raw: &str) -> Result<Option<i64>, FormError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<i64>()
        .map(Some)
        .map_err(|_| FormError::InvalidYear(trimmed.to_string()))
}

/// Validated title, author name and year, ready for the store.
struct BookInput {
    title: String,
    author: String,
    year: Option<i64>,
}

fn read_book_input(fields: &FormFields, missing: FormError) -> Result<BookInput, FormError> {
    let title = fields.title.trim();
    let author = fields.author.trim();
    if title.is_empty() || author.is_empty() {
        return Err(missing);
    }
    let year = parse_year(&fields.year)?;
    Ok(BookInput {
        title: title.to_string(),
        author: author.to_string(),
        year,
    })
}

/// Add a new book from the form. The author is reused when the name already
/// exists and created otherwise. On success the form is cleared and the
/// views are refreshed.
pub fn add_book(
    conn: &Connection,
    fields: &mut FormFields,
    view: &mut CatalogView,
) -> Result<i64, ActionError> {
    let input = read_book_input(fields, FormError::MissingTitleOrAuthor).map_err(|err| {
        warn!(%err, "add rejected");
        err
    })?;

    let author_id = db::find_or_create_author(conn, &input.author)?;
    let id = db::insert_book(conn, &input.title, author_id, input.year)?;
    info!(book_id = id, title = %input.title, "added book");

    fields.clear();
    view.refresh(conn)?;
    Ok(id)
}

/// Populate the form from the row at `index`. Returns `false` and leaves the
/// form untouched when there is no such row.
pub fn select_book(fields: &mut FormFields, view: &CatalogView, index: usize) -> bool {
    match view.books.get(index) {
        Some(book) => {
            *fields = FormFields::from_book(book);
            true
        }
        None => false,
    }
}

/// Save the form over the selected book. When the book has disappeared the
/// form is left as it was so the user can see what they tried to save.
pub fn update_book(
    conn: &Connection,
    fields: &mut FormFields,
    view: &mut CatalogView,
) -> Result<i64, ActionError> {
    let Some(id) = fields.id else {
        warn!("update rejected without a selection");
        return Err(FormError::MissingSelectionOrField.into());
    };
    let input = read_book_input(fields, FormError::MissingSelectionOrField).map_err(|err| {
        warn!(book_id = id, %err, "update rejected");
        err
    })?;

    let author_id = db::find_or_create_author(conn, &input.author)?;
    if !db::update_book(conn, id, &input.title, author_id, input.year)? {
        warn!(book_id = id, "update target not found");
        return Err(FormError::NotFound(id).into());
    }
    info!(book_id = id, title = %input.title, "updated book");

    fields.clear();
    view.refresh(conn)?;
    Ok(id)
}

/// First half of the delete command: make sure a book is selected and hand
/// back its id so the caller can ask for confirmation.
pub fn request_delete(fields: &FormFields) -> Result<i64, FormError> {
    fields.id.ok_or(FormError::NoSelection)
}

/// Second half of the delete command, run only after the user confirmed.
pub fn confirm_delete(
    conn: &Connection,
    id: i64,
    fields: &mut FormFields,
    view: &mut CatalogView,
) -> Result<(), ActionError> {
    if !db::delete_book(conn, id)? {
        warn!(book_id = id, "delete target not found");
        return Err(FormError::NotFound(id).into());
    }
    info!(book_id = id, "deleted book");

    fields.clear();
    view.refresh(conn)?;
    Ok(())
}

/// Reset the form. Kept next to the other commands so every button maps to a
/// function in this module.
pub fn clear_form(fields: &mut FormFields) {
    fields.clear();
}

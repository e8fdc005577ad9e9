use anyhow::{Context, Result};
use rusqlite::{params, Connection};

use crate::models::Book;

/// Fetch every book joined to its author, ordered by title. The form's row
/// list is rebuilt from this on every refresh.
pub fn fetch_books(conn: &Connection) -> Result<Vec<Book>> {
    let mut stmt = conn
        .prepare(
            "SELECT b.id, b.title, a.name, b.year
             FROM books b
             INNER JOIN authors a ON a.id = b.author_id
             ORDER BY b.title",
        )
        .context("failed to prepare book query")?;

    let books = stmt
        .query_map([], |row| {
            Ok(Book {
                id: row.get(0)?,
                title: row.get(1)?,
                author: row.get(2)?,
                year: row.get(3)?,
            })
        })
        .context("failed to iterate books")?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to collect books")?;

    Ok(books)
}

/// Insert a new book and return its id. `author_id` must already exist; the
/// foreign key rejects anything else.
pub fn insert_book(
    conn: &Connection,
    title: &str,
    author_id: i64,
    year: Option<i64>,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO books (title, author_id, year) VALUES (?1, ?2, ?3)",
        params![title, author_id, year],
    )
    .context("failed to insert book")?;

    Ok(conn.last_insert_rowid())
}

/// Replace every editable field of a book. Returns `false` when no row had
/// that id so the caller can tell the user the book is gone.
pub fn update_book(
    conn: &Connection,
    id: i64,
    title: &str,
    author_id: i64,
    year: Option<i64>,
) -> Result<bool> {
    let updated = conn
        .execute(
            "UPDATE books SET title = ?1, author_id = ?2, year = ?3 WHERE id = ?4",
            params![title, author_id, year, id],
        )
        .context("failed to update book")?;

    Ok(updated > 0)
}

/// Permanently delete a book. The author row is left alone even if nothing
/// references it anymore.
pub fn delete_book(conn: &Connection, id: i64) -> Result<bool> {
    let deleted = conn
        .execute("DELETE FROM books WHERE id = ?1", params![id])
        .context("failed to delete book")?;

    Ok(deleted > 0)
}

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::info;

use crate::models::Author;

/// Retrieve every author sorted by name. This is the source of the author
/// choices offered next to the form.
pub fn fetch_authors(conn: &Connection) -> Result<Vec<Author>> {
    let mut stmt = conn
        .prepare("SELECT id, name FROM authors ORDER BY name")
        .context("failed to prepare author query")?;

    let authors = stmt
        .query_map([], |row| {
            Ok(Author {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })
        .context("failed to load authors")?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to collect authors")?;

    Ok(authors)
}

/// Look an author up by exact name. No case folding and no trimming happen
/// here; "tolkien" and "Tolkien" are different authors.
pub fn find_author(conn: &Connection, name: &str) -> Result<Option<i64>> {
    conn.query_row(
        "SELECT id FROM authors WHERE name = ?1",
        params![name],
        |row| row.get(0),
    )
    .optional()
    .context("failed to look up author")
}

/// Return the id of the author called `name`, inserting a new row first if
/// nobody has that name yet.
pub fn find_or_create_author(conn: &Connection, name: &str) -> Result<i64> {
    if let Some(id) = find_author(conn, name)? {
        return Ok(id);
    }

    conn.execute("INSERT INTO authors (name) VALUES (?1)", params![name])
        .context("failed to insert author")?;

    let id = conn.last_insert_rowid();
    info!(author_id = id, name, "created author");
    Ok(id)
}

/// Remove an author and, through the schema's cascade, every book that
/// references it. Returns `false` when no author had that id. The form never
/// calls this; it exists for store-level maintenance.
pub fn delete_author(conn: &Connection, id: i64) -> Result<bool> {
    let deleted = conn
        .execute("DELETE FROM authors WHERE id = ?1", params![id])
        .context("failed to delete author")?;

    Ok(deleted > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{fetch_books, insert_book, open_in_memory};

    #[test]
    fn find_or_create_reuses_existing_author() {
        let conn = open_in_memory().unwrap();
        let first = find_or_create_author(&conn, "Ursula K. Le Guin").unwrap();
        let second = find_or_create_author(&conn, "Ursula K. Le Guin").unwrap();

        assert_eq!(first, second);
        assert_eq!(fetch_authors(&conn).unwrap().len(), 1);
    }

    #[test]
    fn author_names_match_exactly() {
        let conn = open_in_memory().unwrap();
        let upper = find_or_create_author(&conn, "Tolkien").unwrap();
        let lower = find_or_create_author(&conn, "tolkien").unwrap();

        assert_ne!(upper, lower);
        assert_eq!(find_author(&conn, "TOLKIEN").unwrap(), None);
    }

    #[test]
    fn authors_are_sorted_by_name() {
        let conn = open_in_memory().unwrap();
        find_or_create_author(&conn, "Terry Pratchett").unwrap();
        find_or_create_author(&conn, "Douglas Adams").unwrap();
        find_or_create_author(&conn, "Neil Gaiman").unwrap();

        let names: Vec<String> = fetch_authors(&conn)
            .unwrap()
            .into_iter()
            .map(|author| author.name)
            .collect();
        assert_eq!(names, ["Douglas Adams", "Neil Gaiman", "Terry Pratchett"]);
    }

    #[test]
    fn deleting_an_author_cascades_to_books() {
        let conn = open_in_memory().unwrap();
        let kept = find_or_create_author(&conn, "Octavia E. Butler").unwrap();
        let removed = find_or_create_author(&conn, "Frank Herbert").unwrap();
        insert_book(&conn, "Kindred", kept, Some(1979)).unwrap();
        insert_book(&conn, "Dune", removed, Some(1965)).unwrap();
        insert_book(&conn, "Dune Messiah", removed, None).unwrap();

        assert!(delete_author(&conn, removed).unwrap());

        let titles: Vec<String> = fetch_books(&conn)
            .unwrap()
            .into_iter()
            .map(|book| book.title)
            .collect();
        assert_eq!(titles, ["Kindred"]);
    }

    #[test]
    fn deleting_a_missing_author_reports_false() {
        let conn = open_in_memory().unwrap();
        assert!(!delete_author(&conn, 42).unwrap());
    }
}

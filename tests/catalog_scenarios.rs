use library_catalog::controller::{
    add_book, confirm_delete, request_delete, select_book, update_book,
};
use library_catalog::db::{fetch_authors, fetch_books};
use library_catalog::{open_in_memory, ActionError, CatalogView, FormError, FormFields};
use rusqlite::Connection;

fn form(title: &str, author: &str, year: &str) -> FormFields {
    FormFields {
        id: None,
        title: title.to_string(),
        author: author.to_string(),
        year: year.to_string(),
    }
}

fn setup() -> (Connection, CatalogView) {
    let conn = open_in_memory().unwrap();
    let view = CatalogView::load(&conn).unwrap();
    (conn, view)
}

fn add(conn: &Connection, view: &mut CatalogView, title: &str, author: &str, year: &str) -> i64 {
    add_book(conn, &mut form(title, author, year), view).unwrap()
}

fn hobbit_index(view: &CatalogView) -> usize {
    view.books
        .iter()
        .position(|book| book.title == "The Hobbit")
        .unwrap()
}

fn tolkien_count(conn: &Connection) -> usize {
    fetch_authors(conn)
        .unwrap()
        .iter()
        .filter(|author| author.name == "J.R.R. Tolkien")
        .count()
}

#[test]
fn hobbit_then_fellowship_share_one_author() {
    let (conn, mut view) = setup();

    add(&conn, &mut view, "The Hobbit", "J.R.R. Tolkien", "1937");
    let books = fetch_books(&conn).unwrap();
    assert!(books.iter().any(|book| book.title == "The Hobbit"
        && book.author == "J.R.R. Tolkien"
        && book.year == Some(1937)));

    add(&conn, &mut view, "The Fellowship of the Ring", "J.R.R. Tolkien", "1954");
    assert_eq!(tolkien_count(&conn), 1);
    assert_eq!(fetch_books(&conn).unwrap().len(), 2);
}

#[test]
fn no_op_update_leaves_the_row_unchanged() {
    let (conn, mut view) = setup();
    add(&conn, &mut view, "The Hobbit", "J.R.R. Tolkien", "1937");
    let before = fetch_books(&conn).unwrap();

    let mut fields = FormFields::default();
    assert!(select_book(&mut fields, &view, hobbit_index(&view)));
    fields.year = "1937".to_string();
    update_book(&conn, &mut fields, &mut view).unwrap();

    assert_eq!(fetch_books(&conn).unwrap(), before);
    assert_eq!(tolkien_count(&conn), 1);
}

#[test]
fn confirmed_delete_removes_the_book_but_not_the_author() {
    let (conn, mut view) = setup();
    add(&conn, &mut view, "The Hobbit", "J.R.R. Tolkien", "1937");

    let mut fields = FormFields::default();
    select_book(&mut fields, &view, hobbit_index(&view));
    let id = request_delete(&fields).unwrap();
    confirm_delete(&conn, id, &mut fields, &mut view).unwrap();

    assert!(fetch_books(&conn)
        .unwrap()
        .iter()
        .all(|book| book.title != "The Hobbit"));
    assert_eq!(tolkien_count(&conn), 1);
    assert_eq!(view.author_names(), ["J.R.R. Tolkien"]);
}

#[test]
fn empty_year_is_stored_as_absent() {
    let (conn, mut view) = setup();
    add(&conn, &mut view, "Untitled Notes", "Anonymous", "");
    assert_eq!(fetch_books(&conn).unwrap()[0].year, None);
}

#[test]
fn non_numeric_year_is_rejected_without_writes() {
    let (conn, mut view) = setup();
    let result = add_book(&conn, &mut form("Book", "Writer", "abc"), &mut view);

    assert!(matches!(
        result,
        Err(ActionError::Form(FormError::InvalidYear(_)))
    ));
    assert!(fetch_books(&conn).unwrap().is_empty());
    assert!(fetch_authors(&conn).unwrap().is_empty());
}

#[test]
fn stale_identifiers_signal_not_found() {
    let (conn, mut view) = setup();
    let id = add(&conn, &mut view, "Middlemarch", "George Eliot", "1871");
    let before = fetch_books(&conn).unwrap();
    let missing = id + 1;

    let mut fields = form("Middlemarch", "George Eliot", "1871");
    fields.id = Some(missing);
    assert!(matches!(
        update_book(&conn, &mut fields, &mut view),
        Err(ActionError::Form(FormError::NotFound(n))) if n == missing
    ));
    assert!(matches!(
        confirm_delete(&conn, missing, &mut fields, &mut view),
        Err(ActionError::Form(FormError::NotFound(n))) if n == missing
    ));
    assert_eq!(fetch_books(&conn).unwrap(), before);
}

#[test]
fn duplicate_titles_are_allowed() {
    let (conn, mut view) = setup();
    add(&conn, &mut view, "Collected Poems", "W. B. Yeats", "");
    add(&conn, &mut view, "Collected Poems", "Sylvia Plath", "1981");
    assert_eq!(fetch_books(&conn).unwrap().len(), 2);
    assert_eq!(fetch_authors(&conn).unwrap().len(), 2);
}

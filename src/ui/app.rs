use std::mem;

use anyhow::Result;
use crossterm::event::KeyCode;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Block, Borders, Cell, Clear, List, ListItem, Paragraph, Row, Table, TableState, Wrap,
};
use ratatui::Frame;
use rusqlite::Connection;

use crate::controller::{self, CatalogView, FormFields};
use crate::error::{ActionError, Severity};

use super::forms::{BookForm, Focus, FormField};
use super::helpers::{centered_rect, clamp_cursor, offset_cursor};

/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
/// Height of the form panel: borders plus the four field lines.
const FORM_HEIGHT: u16 = 6;
/// Rows skipped by PageUp / PageDown in the book list.
const PAGE_STEP: isize = 10;

/// The four form commands, bound to Ctrl shortcuts by the terminal loop.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Command {
    Add,
    Update,
    Delete,
    Clear,
    Quit,
}

/// Whether the form is usable or a modal is waiting for an answer.
enum Mode {
    Normal,
    Dialog(Dialog),
    ConfirmDelete(ConfirmDelete),
}

/// Blocking message box raised by a rejected action.
struct Dialog {
    severity: Severity,
    message: String,
}

/// Pending yes/no question before a book is deleted.
struct ConfirmDelete {
    id: i64,
    title: String,
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Central application state. Owns the only database connection for as long
/// as the form is open.
pub struct App {
    conn: Connection,
    view: CatalogView,
    form: BookForm,
    cursor: usize,
    mode: Mode,
    status: Option<StatusMessage>,
}

impl App {
    pub fn new(conn: Connection, view: CatalogView) -> Self {
        Self {
            conn,
            view,
            form: BookForm::default(),
            cursor: 0,
            mode: Mode::Normal,
            status: None,
        }
    }

    /// Give the connection back so the caller can close it explicitly.
    pub fn into_connection(self) -> Connection {
        self.conn
    }

    /// Dispatch a plain key press. Returns `true` when the user asked to quit.
    pub(crate) fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);

        self.mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit)?,
            Mode::Dialog(dialog) => Self::handle_dialog_key(code, dialog),
            Mode::ConfirmDelete(confirm) => self.handle_confirm_delete(code, confirm)?,
        };

        Ok(exit)
    }

    /// Run one of the form commands. Ignored while a modal is open, except
    /// for quitting.
    pub(crate) fn run_command(&mut self, command: Command) -> Result<bool> {
        if command == Command::Quit {
            return Ok(true);
        }
        if !matches!(self.mode, Mode::Normal) {
            return Ok(false);
        }

        self.clear_status();
        match command {
            Command::Add => self.add_book()?,
            Command::Update => self.update_book()?,
            Command::Delete => self.request_delete(),
            Command::Clear => self.clear_form(),
            Command::Quit => {}
        }
        Ok(false)
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        match code {
            KeyCode::Esc => {
                if !self.form.cancel_autocomplete() {
                    *exit = true;
                }
            }
            KeyCode::Tab => {
                if !self.form.accept_suggestion() {
                    self.form.focus_next();
                }
            }
            KeyCode::BackTab => self.form.focus_previous(),
            KeyCode::Right if self.form.focus == Focus::Author => {
                self.form.accept_suggestion();
            }
            _ if self.form.focus == Focus::List => self.handle_list_key(code),
            KeyCode::Enter => self.form.focus_next(),
            KeyCode::Backspace => self.form.backspace(),
            KeyCode::Char(ch) => {
                self.form.push_char(ch);
            }
            _ => {}
        }

        self.form.update_suggestion(&self.view.author_names());
        Ok(Mode::Normal)
    }

    fn handle_list_key(&mut self, code: KeyCode) {
        let len = self.view.books.len();
        match code {
            KeyCode::Up => self.cursor = offset_cursor(self.cursor, -1, len),
            KeyCode::Down => self.cursor = offset_cursor(self.cursor, 1, len),
            KeyCode::PageUp => self.cursor = offset_cursor(self.cursor, -PAGE_STEP, len),
            KeyCode::PageDown => self.cursor = offset_cursor(self.cursor, PAGE_STEP, len),
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.cursor = len.saturating_sub(1),
            KeyCode::Enter | KeyCode::Char(' ') => self.select_row(),
            _ => {}
        }
    }

    fn handle_dialog_key(code: KeyCode, dialog: Dialog) -> Mode {
        match code {
            KeyCode::Enter | KeyCode::Esc => Mode::Normal,
            _ => Mode::Dialog(dialog),
        }
    }

    fn handle_confirm_delete(&mut self, code: KeyCode, confirm: ConfirmDelete) -> Result<Mode> {
        match code {
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.set_status("Deletion cancelled.", StatusKind::Info);
                Ok(Mode::Normal)
            }
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                let result = controller::confirm_delete(
                    &self.conn,
                    confirm.id,
                    &mut self.form.fields,
                    &mut self.view,
                );
                match result {
                    Ok(()) => {
                        self.after_save(None);
                        self.set_status(format!("Deleted \"{}\".", confirm.title), StatusKind::Info);
                        Ok(Mode::Normal)
                    }
                    Err(err) => self.report(err),
                }
            }
            _ => Ok(Mode::ConfirmDelete(confirm)),
        }
    }

    fn add_book(&mut self) -> Result<()> {
        match controller::add_book(&self.conn, &mut self.form.fields, &mut self.view) {
            Ok(id) => {
                self.after_save(Some(id));
                self.set_status("Book added.", StatusKind::Info);
            }
            Err(err) => self.mode = self.report(err)?,
        }
        Ok(())
    }

    fn update_book(&mut self) -> Result<()> {
        match controller::update_book(&self.conn, &mut self.form.fields, &mut self.view) {
            Ok(id) => {
                self.after_save(Some(id));
                self.set_status("Book updated.", StatusKind::Info);
            }
            Err(err) => self.mode = self.report(err)?,
        }
        Ok(())
    }

    fn request_delete(&mut self) {
        match controller::request_delete(&self.form.fields) {
            Ok(id) => {
                self.mode = Mode::ConfirmDelete(ConfirmDelete {
                    id,
                    title: self.form.fields.title.trim().to_string(),
                });
            }
            Err(err) => {
                self.mode = Mode::Dialog(Dialog {
                    severity: err.severity(),
                    message: err.to_string(),
                });
            }
        }
    }

    fn clear_form(&mut self) {
        controller::clear_form(&mut self.form.fields);
        self.form.load(FormFields::default());
        self.form.focus = Focus::Title;
    }

    fn select_row(&mut self) {
        if controller::select_book(&mut self.form.fields, &self.view, self.cursor) {
            let fields = mem::take(&mut self.form.fields);
            self.form.load(fields);
        }
    }

    /// Reset the form widgets after a successful write and keep the list
    /// cursor on the touched book when it is still listed.
    fn after_save(&mut self, touched: Option<i64>) {
        self.form.load(FormFields::default());
        self.cursor = touched
            .and_then(|id| self.view.books.iter().position(|book| book.id == id))
            .unwrap_or_else(|| clamp_cursor(self.cursor, self.view.books.len()));
    }

    /// Turn a recoverable failure into a dialog. Storage errors are passed up
    /// and end the event loop.
    fn report(&mut self, err: ActionError) -> Result<Mode> {
        match err {
            ActionError::Form(err) => {
                if err.severity() == Severity::Error {
                    self.set_status(err.to_string(), StatusKind::Error);
                }
                Ok(Mode::Dialog(Dialog {
                    severity: err.severity(),
                    message: err.to_string(),
                }))
            }
            ActionError::Storage(err) => Err(err),
        }
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(FORM_HEIGHT),
                Constraint::Min(0),
                Constraint::Length(FOOTER_HEIGHT),
            ])
            .split(area);

        let top = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(chunks[0]);

        self.draw_form(frame, top[0]);
        self.draw_author_choices(frame, top[1]);
        self.draw_book_table(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);

        match &self.mode {
            Mode::Dialog(dialog) => Self::draw_dialog(frame, area, dialog),
            Mode::ConfirmDelete(confirm) => Self::draw_confirm_delete(frame, area, confirm),
            Mode::Normal => {}
        }
    }

    fn draw_form(&self, frame: &mut Frame, area: Rect) {
        let border_style = if self.form.focus == Focus::List {
            Style::default()
        } else {
            Style::default().fg(Color::Cyan)
        };
        let block = Block::default()
            .title("Book")
            .borders(Borders::ALL)
            .border_style(border_style);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let lines = vec![
            self.form.id_line(),
            self.form.build_line("Title", FormField::Title),
            self.form.build_line("Author", FormField::Author),
            self.form.build_line("Year", FormField::Year),
        ];
        frame.render_widget(Paragraph::new(lines), inner);

        if !matches!(self.mode, Mode::Normal) {
            return;
        }
        let cursor = match self.form.active_field() {
            Some(FormField::Title) => Some(("Title: ", FormField::Title, 1)),
            Some(FormField::Author) => Some(("Author: ", FormField::Author, 2)),
            Some(FormField::Year) => Some(("Year: ", FormField::Year, 3)),
            None => None,
        };
        if let Some((prefix, field, row)) = cursor {
            let x = inner.x + prefix.len() as u16 + self.form.value_len(field) as u16;
            frame.set_cursor_position((x.min(inner.right().saturating_sub(1)), inner.y + row));
        }
    }

    fn draw_author_choices(&self, frame: &mut Frame, area: Rect) {
        let names = self.view.author_names();
        let matches = self.form.matching_authors(&names);
        let title = format!("Authors ({})", names.len());
        let block = Block::default().title(title).borders(Borders::ALL);

        let items: Vec<ListItem> = matches
            .into_iter()
            .map(|name| ListItem::new(name.clone()))
            .collect();
        frame.render_widget(List::new(items).block(block), area);
    }

    fn draw_book_table(&self, frame: &mut Frame, area: Rect) {
        let border_style = if self.form.focus == Focus::List {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default()
        };
        let block = Block::default()
            .title(format!("Books ({})", self.view.books.len()))
            .borders(Borders::ALL)
            .border_style(border_style);

        if self.view.books.is_empty() {
            let message = Paragraph::new("No books yet. Fill in the form and press Ctrl-N.")
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(message, area);
            return;
        }

        let header = Row::new(["ID", "Title", "Author", "Year"])
            .style(Style::default().add_modifier(Modifier::BOLD));
        let rows = self.view.books.iter().map(|book| {
            let style = if self.form.fields.id == Some(book.id) {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default()
            };
            Row::new([
                Cell::from(book.id.to_string()),
                Cell::from(book.title.clone()),
                Cell::from(book.author.clone()),
                Cell::from(book.year_text()),
            ])
            .style(style)
        });

        let widths = [
            Constraint::Length(6),
            Constraint::Percentage(55),
            Constraint::Percentage(30),
            Constraint::Length(6),
        ];
        let table = Table::new(rows, widths)
            .header(header)
            .block(block)
            .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED));

        let mut state = TableState::default();
        if self.form.focus == Focus::List {
            state.select(Some(self.cursor));
        }
        frame.render_stateful_widget(table, area, &mut state);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from("")
        };

        let instructions = Line::from(Span::styled(
            self.footer_instructions(),
            Style::default().fg(Color::Gray),
        ));

        let paragraph = Paragraph::new(vec![status_line, instructions]).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> &'static str {
        match (&self.mode, self.form.focus) {
            (Mode::Dialog(_), _) => "Enter/Esc close",
            (Mode::ConfirmDelete(_), _) => "Y confirm • N/Esc cancel",
            (Mode::Normal, Focus::List) => {
                "↑/↓ move • Enter select • Tab form • ^N add • ^U update • ^D delete • ^L clear • Esc quit"
            }
            (Mode::Normal, _) => {
                "Tab next/accept • ^N add • ^U update • ^D delete • ^L clear • Esc quit"
            }
        }
    }

    fn draw_dialog(frame: &mut Frame, area: Rect, dialog: &Dialog) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let (title, color) = match dialog.severity {
            Severity::Warning => ("Warning", Color::Yellow),
            Severity::Error => ("Error", Color::Red),
        };
        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(color));
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let lines = vec![
            Line::from(dialog.message.clone()),
            Line::from(""),
            Line::from(Span::styled(
                "Press Enter or Esc to continue.",
                Style::default().fg(Color::Gray),
            )),
        ];
        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn draw_confirm_delete(frame: &mut Frame, area: Rect, confirm: &ConfirmDelete) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title("Confirm Deletion")
            .borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let lines = vec![
            Line::from(format!(
                "Delete book #{} ({})?",
                confirm.id, confirm.title
            )),
            Line::from("The author stays in the catalog."),
            Line::from(""),
            Line::from(Span::styled(
                "Press Y to confirm or N / Esc to cancel.",
                Style::default().fg(Color::Gray),
            )),
        ];

        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;

    fn app() -> App {
        let conn = open_in_memory().unwrap();
        let view = CatalogView::load(&conn).unwrap();
        App::new(conn, view)
    }

    fn type_text(app: &mut App, text: &str) {
        for ch in text.chars() {
            app.handle_key(KeyCode::Char(ch)).unwrap();
        }
    }

    fn fill(app: &mut App, title: &str, author: &str, year: &str) {
        app.run_command(Command::Clear).unwrap();
        type_text(app, title);
        app.form.focus = Focus::Author;
        type_text(app, author);
        app.form.focus = Focus::Year;
        type_text(app, year);
    }

    fn dialog(app: &App) -> Option<(Severity, &str)> {
        match &app.mode {
            Mode::Dialog(dialog) => Some((dialog.severity, dialog.message.as_str())),
            _ => None,
        }
    }

    #[test]
    fn add_from_typed_fields() {
        let mut app = app();
        fill(&mut app, "The Hobbit", "J.R.R. Tolkien", "1937");

        assert!(!app.run_command(Command::Add).unwrap());

        assert!(dialog(&app).is_none());
        assert_eq!(app.view.books.len(), 1);
        assert_eq!(app.view.books[0].year, Some(1937));
        assert_eq!(app.form.fields, FormFields::default());
    }

    #[test]
    fn missing_fields_raise_a_warning_dialog() {
        let mut app = app();
        app.run_command(Command::Add).unwrap();

        let (severity, _) = dialog(&app).unwrap();
        assert_eq!(severity, Severity::Warning);

        // Commands are ignored until the dialog is dismissed.
        app.run_command(Command::Clear).unwrap();
        assert!(dialog(&app).is_some());
        app.handle_key(KeyCode::Enter).unwrap();
        assert!(dialog(&app).is_none());
    }

    #[test]
    fn enter_on_the_list_selects_the_row() {
        let mut app = app();
        fill(&mut app, "Emma", "Jane Austen", "");
        app.run_command(Command::Add).unwrap();
        fill(&mut app, "Persuasion", "Jane Austen", "1817");
        app.run_command(Command::Add).unwrap();

        app.form.focus = Focus::List;
        app.handle_key(KeyCode::Home).unwrap();
        app.handle_key(KeyCode::Down).unwrap();
        app.handle_key(KeyCode::Enter).unwrap();

        assert_eq!(app.form.fields.title, "Persuasion");
        assert_eq!(app.form.fields.year, "1817");
        assert_eq!(app.form.fields.id, Some(app.view.books[1].id));
    }

    #[test]
    fn delete_waits_for_confirmation() {
        let mut app = app();
        fill(&mut app, "Dracula", "Bram Stoker", "1897");
        app.run_command(Command::Add).unwrap();
        app.form.focus = Focus::List;
        app.handle_key(KeyCode::Enter).unwrap();

        app.run_command(Command::Delete).unwrap();
        assert!(matches!(app.mode, Mode::ConfirmDelete(_)));
        app.handle_key(KeyCode::Char('n')).unwrap();
        assert_eq!(app.view.books.len(), 1);

        app.run_command(Command::Delete).unwrap();
        app.handle_key(KeyCode::Char('y')).unwrap();
        assert!(matches!(app.mode, Mode::Normal));
        assert!(app.view.books.is_empty());
        assert_eq!(app.view.author_names(), ["Bram Stoker"]);
    }

    #[test]
    fn delete_without_selection_warns() {
        let mut app = app();
        app.run_command(Command::Delete).unwrap();
        let (severity, message) = dialog(&app).unwrap();
        assert_eq!(severity, Severity::Warning);
        assert_eq!(message, "Select a book to delete.");
    }

    #[test]
    fn stale_update_raises_an_error_dialog() {
        let mut app = app();
        fill(&mut app, "Ulysses", "James Joyce", "1922");
        app.run_command(Command::Add).unwrap();
        app.form.focus = Focus::List;
        app.handle_key(KeyCode::Enter).unwrap();
        let id = app.form.fields.id.unwrap();
        crate::db::delete_book(&app.conn, id).unwrap();

        app.run_command(Command::Update).unwrap();

        let (severity, _) = dialog(&app).unwrap();
        assert_eq!(severity, Severity::Error);
        assert_eq!(app.form.fields.id, Some(id));
    }

    #[test]
    fn esc_dismisses_a_suggestion_before_quitting() {
        let mut app = app();
        fill(&mut app, "Emma", "Jane Austen", "");
        app.run_command(Command::Add).unwrap();

        app.form.focus = Focus::Author;
        type_text(&mut app, "Ja");
        assert!(app.form.suggestion.is_some());

        assert!(!app.handle_key(KeyCode::Esc).unwrap());
        assert!(app.form.suggestion.is_none());
        assert!(app.handle_key(KeyCode::Esc).unwrap());
    }
}

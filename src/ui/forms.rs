use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::controller::FormFields;

/// Widgets that can hold keyboard focus, in Tab order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub(crate) enum Focus {
    #[default]
    Title,
    Author,
    Year,
    List,
}

/// Editable text fields of the form. The identifier is displayed but never
/// edited, so it has no entry here.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum FormField {
    Title,
    Author,
    Year,
}

/// Input state for the book form: the controller's fields plus focus and the
/// author autocomplete bookkeeping.
#[derive(Default, Clone)]
pub(crate) struct BookForm {
    pub(crate) fields: FormFields,
    pub(crate) focus: Focus,
    pub(crate) suggestion: Option<String>,
    pub(crate) autocomplete_disabled: bool,
}

impl BookForm {
    /// Move focus forward (Title → Author → Year → List).
    pub(crate) fn focus_next(&mut self) {
        self.focus = match self.focus {
            Focus::Title => Focus::Author,
            Focus::Author => Focus::Year,
            Focus::Year => Focus::List,
            Focus::List => Focus::Title,
        };
        self.drop_suggestion_off_author();
    }

    /// Move focus backward.
    pub(crate) fn focus_previous(&mut self) {
        self.focus = match self.focus {
            Focus::Title => Focus::List,
            Focus::Author => Focus::Title,
            Focus::Year => Focus::Author,
            Focus::List => Focus::Year,
        };
        self.drop_suggestion_off_author();
    }

    /// Field under the cursor, if focus is inside the form.
    pub(crate) fn active_field(&self) -> Option<FormField> {
        match self.focus {
            Focus::Title => Some(FormField::Title),
            Focus::Author => Some(FormField::Author),
            Focus::Year => Some(FormField::Year),
            Focus::List => None,
        }
    }

    /// Insert a character into the active field. Returns `false` when the
    /// key was not text or focus is on the list.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        match self.active_field() {
            Some(FormField::Title) => self.fields.title.push(ch),
            Some(FormField::Author) => {
                self.autocomplete_disabled = false;
                self.fields.author.push(ch);
            }
            Some(FormField::Year) => self.fields.year.push(ch),
            None => return false,
        }
        true
    }

    /// Remove a character from the active field.
    pub(crate) fn backspace(&mut self) {
        match self.active_field() {
            Some(FormField::Title) => {
                self.fields.title.pop();
            }
            Some(FormField::Author) => {
                self.fields.author.pop();
                self.autocomplete_disabled = false;
            }
            Some(FormField::Year) => {
                self.fields.year.pop();
            }
            None => {}
        }
    }

    /// Replace the fields wholesale, as row selection and clear do.
    pub(crate) fn load(&mut self, fields: FormFields) {
        self.fields = fields;
        self.suggestion = None;
        self.autocomplete_disabled = false;
    }

    /// Recompute the ghost suggestion for the author field from the current
    /// author choices.
    pub(crate) fn update_suggestion(&mut self, authors: &[String]) {
        if self.focus != Focus::Author
            || self.autocomplete_disabled
            || self.fields.author.chars().count() < 2
        {
            self.suggestion = None;
            return;
        }

        let current_lower = self.fields.author.to_lowercase();
        self.suggestion = authors
            .iter()
            .find(|candidate| candidate.to_lowercase().starts_with(&current_lower))
            .filter(|candidate| **candidate != self.fields.author)
            .cloned();
    }

    /// Apply the suggested author name.
    pub(crate) fn accept_suggestion(&mut self) -> bool {
        if self.suggestion_suffix().is_none() {
            return false;
        }
        match self.suggestion.take() {
            Some(candidate) => {
                self.fields.author = candidate;
                self.autocomplete_disabled = true;
                true
            }
            None => false,
        }
    }

    /// Dismiss the suggestion until the author field is edited again.
    pub(crate) fn cancel_autocomplete(&mut self) -> bool {
        if self.focus == Focus::Author && self.suggestion.is_some() {
            self.autocomplete_disabled = true;
            self.suggestion = None;
            return true;
        }
        false
    }

    fn drop_suggestion_off_author(&mut self) {
        if self.focus != Focus::Author {
            self.suggestion = None;
        }
    }

    /// Characters the suggestion would add after what is already typed.
    pub(crate) fn suggestion_suffix(&self) -> Option<String> {
        let candidate = self.suggestion.as_ref()?;
        let suffix: String = candidate
            .chars()
            .skip(self.fields.author.chars().count())
            .collect();
        if suffix.is_empty() {
            None
        } else {
            Some(suffix)
        }
    }

    /// Author choices narrowed to those starting with the typed text
    /// (case-insensitive). With an empty field every author is offered.
    pub(crate) fn matching_authors<'a>(&self, authors: &'a [String]) -> Vec<&'a String> {
        let typed = self.fields.author.trim().to_lowercase();
        authors
            .iter()
            .filter(|name| typed.is_empty() || name.to_lowercase().starts_with(&typed))
            .collect()
    }

    /// Render the read-only identifier line.
    pub(crate) fn id_line(&self) -> Line<'static> {
        let display = match self.fields.id {
            Some(id) => Span::raw(id.to_string()),
            None => Span::styled("<none selected>", Style::default().fg(Color::DarkGray)),
        };
        Line::from(vec![Span::raw("ID: "), display])
    }

    /// Render a styled line for one editable field, with the ghosted author
    /// suggestion appended when there is one.
    pub(crate) fn build_line(&self, field_name: &str, field: FormField) -> Line<'static> {
        let is_active = self.active_field() == Some(field);
        let value = self.value(field);

        let placeholder = match field {
            FormField::Title | FormField::Author => "<required>",
            FormField::Year => "<optional>",
        };

        let style = if is_active {
            Style::default().fg(Color::Yellow)
        } else if value.is_empty() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };

        let mut spans = vec![Span::raw(format!("{field_name}: "))];
        let ghost = if field == FormField::Author && is_active {
            self.suggestion_suffix()
        } else {
            None
        };

        if value.is_empty() && ghost.is_none() {
            spans.push(Span::styled(placeholder.to_string(), style));
        } else {
            spans.push(Span::styled(value.to_string(), style));
        }
        if let Some(suffix) = ghost {
            spans.push(Span::styled(suffix, Style::default().fg(Color::DarkGray)));
        }

        Line::from(spans)
    }

    fn value(&self, field: FormField) -> &str {
        match field {
            FormField::Title => &self.fields.title,
            FormField::Author => &self.fields.author,
            FormField::Year => &self.fields.year,
        }
    }

    /// Character length of the requested field.
    pub(crate) fn value_len(&self, field: FormField) -> usize {
        self.value(field).chars().count()
    }
}

//! Error types for the form actions. Storage problems stay `anyhow::Error` all
//! the way up; only the recoverable cases get named variants so the UI can
//! pick the right dialog for them.

use thiserror::Error;

/// Problems the user can fix from the form. None of these leave a trace in
/// the database.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormError {
    #[error("Fill in the title and the author.")]
    MissingTitleOrAuthor,
    #[error("Select a book and fill in the title and the author.")]
    MissingSelectionOrField,
    #[error("Select a book to delete.")]
    NoSelection,
    #[error("Year must be an integer, got \"{0}\".")]
    InvalidYear(String),
    #[error("Book #{0} was not found.")]
    NotFound(i64),
}

/// How loudly a [`FormError`] should be reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

impl FormError {
    /// Input mistakes are warnings. A vanished record is an error.
    pub fn severity(&self) -> Severity {
        match self {
            FormError::NotFound(_) => Severity::Error,
            _ => Severity::Warning,
        }
    }
}

/// Result of running one form action.
#[derive(Debug, Error)]
pub enum ActionError {
    #[error(transparent)]
    Form(#[from] FormError),
    /// The database refused a read or write. The application does not try to
    /// recover from this.
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

//! Import error types.

use igen_shared::{AppError, FieldError};
use thiserror::Error;

/// Errors that can occur during a bulk import.
#[derive(Debug, Error)]
pub enum ImportError {
    /// The multipart body has no `file` field.
    #[error("No file uploaded")]
    MissingFile,

    /// The file is not a readable CSV document.
    #[error("Unreadable CSV file: {0}")]
    Unreadable(String),

    /// The file has a header but no data rows.
    #[error("The uploaded file contains no transactions.")]
    Empty,

    /// One or more rows are invalid; nothing was imported.
    #[error("{} invalid row(s); nothing was imported", count_rows(.0))]
    InvalidRows(Vec<FieldError>),
}

fn count_rows(details: &[FieldError]) -> usize {
    let mut rows: Vec<_> = details.iter().filter_map(|d| d.row).collect();
    rows.dedup();
    rows.len()
}

impl ImportError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        "VALIDATION_ERROR"
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        400
    }
}

impl From<ImportError> for AppError {
    fn from(err: ImportError) -> Self {
        let message = err.to_string();
        match err {
            ImportError::InvalidRows(details) => Self::InvalidFields { message, details },
            ImportError::MissingFile => Self::InvalidFields {
                message,
                details: vec![FieldError::new("file", "No file uploaded")],
            },
            ImportError::Unreadable(_) | ImportError::Empty => Self::Validation(message),
        }
    }
}

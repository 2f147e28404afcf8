//! Classification error types.

use igen_shared::types::format_amount;
use igen_shared::{AppError, FieldError};
use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use super::types::ReferenceKind;

/// Errors that can occur while classifying a transaction.
#[derive(Debug, Error)]
pub enum ClassificationError {
    /// The batch holds no rows.
    #[error("Expected a non-empty list of classifications.")]
    EmptyBatch,

    /// The body is not a list.
    #[error("Expected a list of classifications.")]
    MalformedBatch,

    /// A row's amount is missing or not a number.
    #[error("Row {row}: {message}")]
    InvalidAmount {
        /// 0-based row index.
        row: usize,
        /// Reason.
        message: String,
    },

    /// The split amounts do not add up to the transaction amount.
    #[error(
        "Split amount ({}) must equal the transaction amount ({})",
        format_amount(.total),
        format_amount(.expected)
    )]
    SplitSumMismatch {
        /// Sum of submitted split amounts.
        total: Decimal,
        /// Parent transaction amount.
        expected: Decimal,
    },

    /// One or more rows failed schema validation.
    #[error("Invalid classification rows")]
    InvalidRows(Vec<FieldError>),

    /// A row references a row that does not exist.
    #[error("{kind} not found: {id} (row {row}, field {field})", field = .kind.field())]
    ReferenceNotFound {
        /// 0-based row index.
        row: usize,
        /// Kind of the referenced row.
        kind: ReferenceKind,
        /// Referenced id.
        id: Uuid,
    },

    /// The transaction does not exist or lies outside the caller's scope.
    #[error("Transaction not found: {0}")]
    TransactionNotFound(Uuid),
}

impl ClassificationError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::ReferenceNotFound { .. } | Self::TransactionNotFound(_) => "NOT_FOUND",
            _ => "VALIDATION_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::ReferenceNotFound { .. } | Self::TransactionNotFound(_) => 404,
            _ => 400,
        }
    }
}

impl From<ClassificationError> for AppError {
    fn from(err: ClassificationError) -> Self {
        let message = err.to_string();
        match err {
            ClassificationError::EmptyBatch
            | ClassificationError::MalformedBatch
            | ClassificationError::SplitSumMismatch { .. } => Self::Validation(message),
            ClassificationError::InvalidAmount { row, message: reason } => Self::InvalidFields {
                message,
                details: vec![FieldError::at_row(row, "amount", reason)],
            },
            ClassificationError::InvalidRows(details) => Self::InvalidFields { message, details },
            ClassificationError::ReferenceNotFound { .. }
            | ClassificationError::TransactionNotFound(_) => Self::NotFound(message),
        }
    }
}

//! Transaction error types.

use igen_shared::{AppError, FieldError};
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur while creating or reading transactions.
#[derive(Debug, Error)]
pub enum TransactionError {
    /// One or more fields failed validation.
    #[error("Invalid transaction")]
    Invalid(Vec<FieldError>),

    /// The transaction does not exist or lies outside the caller's scope.
    #[error("Transaction not found: {0}")]
    NotFound(Uuid),

    /// A referenced row does not exist or belongs to another company.
    #[error("{resource} not found: {id}")]
    ReferenceNotFound {
        /// Name of the referenced resource.
        resource: &'static str,
        /// Referenced id.
        id: Uuid,
    },
}

impl TransactionError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Invalid(_) => "VALIDATION_ERROR",
            Self::NotFound(_) | Self::ReferenceNotFound { .. } => "NOT_FOUND",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::Invalid(_) => 400,
            Self::NotFound(_) | Self::ReferenceNotFound { .. } => 404,
        }
    }
}

impl From<TransactionError> for AppError {
    fn from(err: TransactionError) -> Self {
        let message = err.to_string();
        match err {
            TransactionError::Invalid(details) => Self::InvalidFields { message, details },
            TransactionError::NotFound(_) | TransactionError::ReferenceNotFound { .. } => {
                Self::NotFound(message)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(TransactionError::Invalid(vec![]).http_status_code(), 400);
        assert_eq!(TransactionError::NotFound(Uuid::nil()).error_code(), "NOT_FOUND");

        let app: AppError = TransactionError::ReferenceNotFound {
            resource: "BankAccount",
            id: Uuid::nil(),
        }
        .into();
        assert_eq!(app.status_code(), 404);
        assert!(app.message().starts_with("BankAccount not found"));
    }
}

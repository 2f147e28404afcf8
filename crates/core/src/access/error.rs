//! Access error types.

use igen_shared::AppError;
use thiserror::Error;
use uuid::Uuid;

use super::scope::ResourceKind;

/// Errors raised while resolving or enforcing an access scope.
#[derive(Debug, Error)]
pub enum AccessError {
    /// The token carries a role the system does not know.
    #[error("Unknown role: {0}")]
    UnknownRole(String),

    /// The row does not exist or lies outside the caller's scope.
    #[error("{resource} not found: {id}")]
    NotFound {
        /// Kind of the requested row.
        resource: ResourceKind,
        /// Requested identifier.
        id: Uuid,
    },
}

impl AccessError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownRole(_) => "UNAUTHORIZED",
            Self::NotFound { .. } => "NOT_FOUND",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::UnknownRole(_) => 401,
            Self::NotFound { .. } => 404,
        }
    }
}

impl From<AccessError> for AppError {
    fn from(err: AccessError) -> Self {
        let message = err.to_string();
        match err {
            AccessError::UnknownRole(_) => Self::Unauthorized(message),
            AccessError::NotFound { .. } => Self::NotFound(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_and_status() {
        let err = AccessError::UnknownRole("ADMIN".into());
        assert_eq!(err.error_code(), "UNAUTHORIZED");
        assert_eq!(err.http_status_code(), 401);

        let err = AccessError::NotFound {
            resource: ResourceKind::Transaction,
            id: Uuid::nil(),
        };
        assert_eq!(err.error_code(), "NOT_FOUND");
        assert_eq!(err.http_status_code(), 404);
        assert_eq!(
            err.to_string(),
            "Transaction not found: 00000000-0000-0000-0000-000000000000"
        );
    }

    #[test]
    fn test_into_app_error() {
        let app: AppError = AccessError::NotFound {
            resource: ResourceKind::Company,
            id: Uuid::nil(),
        }
        .into();
        assert_eq!(app.status_code(), 404);

        let app: AppError = AccessError::UnknownRole("X".into()).into();
        assert_eq!(app.error_code(), "UNAUTHORIZED");
    }
}

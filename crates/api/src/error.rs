//! JSON error responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use igen_shared::{AppError, FieldError};
use serde::Serialize;
use tracing::error;

/// Error body returned by every endpoint.
#[derive(Debug, Serialize)]
pub struct ErrorBody<'a> {
    /// Machine-readable code, e.g. `VALIDATION_ERROR`.
    pub error: &'static str,
    /// Human-readable message.
    pub message: &'a str,
    /// Per-row, per-field failures.
    #[serde(skip_serializing_if = "no_details")]
    pub details: &'a [FieldError],
}

fn no_details(details: &&[FieldError]) -> bool {
    details.is_empty()
}

/// Handler error: any domain or repository error converts into it.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl<E> From<E> for ApiError
where
    E: Into<AppError>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        let status =
            StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        // Store and internal failures are logged, never echoed.
        let message = if err.is_server_error() {
            error!(error = %err, "Request failed");
            "An internal error occurred"
        } else {
            err.message()
        };

        let body = ErrorBody {
            error: err.error_code(),
            message,
            details: err.details(),
        };
        (status, Json(body)).into_response()
    }
}

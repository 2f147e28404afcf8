//! Transaction routes: CRUD and CSV bulk upload.

use axum::{
    Json, Router,
    extract::{
        Multipart, Path, Query, State,
        multipart::MultipartRejection,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::NaiveDate;
use igen_core::import::{ImportError, ImportService};
use igen_core::transaction::{Direction, TransactionDraft, TransactionError};
use igen_db::{TransactionFilter, TransactionRepository};
use igen_shared::AppError;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;
use uuid::Uuid;

use crate::{AppState, error::ApiError, extractors::CallerScope};

/// Creates the transaction routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/transactions", get(list_transactions).post(create_transaction))
        .route("/transactions/bulk-upload", post(bulk_upload))
        .route(
            "/transactions/{transaction_id}",
            get(get_transaction).delete(delete_transaction),
        )
}

/// Query parameters for listing transactions.
#[derive(Debug, Deserialize)]
pub struct ListTransactionsQuery {
    /// Filter by company.
    pub company: Option<Uuid>,
    /// Filter by direction, `CREDIT` or `DEBIT`.
    pub direction: Option<String>,
    /// Filter by date range start (YYYY-MM-DD).
    pub from: Option<NaiveDate>,
    /// Filter by date range end (YYYY-MM-DD).
    pub to: Option<NaiveDate>,
}

impl ListTransactionsQuery {
    fn into_filter(self) -> Result<TransactionFilter, AppError> {
        let direction = self
            .direction
            .as_deref()
            .map(str::parse::<Direction>)
            .transpose()
            .map_err(AppError::Validation)?;

        Ok(TransactionFilter {
            company: self.company,
            direction,
            date_from: self.from,
            date_to: self.to,
        })
    }
}

/// Maps a malformed path id to the same 404 a missing row gets.
pub(crate) fn path_id(path: Result<Path<Uuid>, PathRejection>) -> Result<Uuid, ApiError> {
    path.map(|Path(id)| id)
        .map_err(|rejection| ApiError(AppError::NotFound(rejection.body_text())))
}

/// Maps a JSON body rejection to a validation error.
pub(crate) fn json_body(payload: Result<Json<Value>, JsonRejection>) -> Result<Value, ApiError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| ApiError(AppError::Validation(rejection.body_text())))
}

/// GET `/transactions` - List transactions visible to the caller.
async fn list_transactions(
    State(state): State<AppState>,
    CallerScope(scope): CallerScope,
    query: Result<Query<ListTransactionsQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(query) = query.map_err(|r| AppError::Validation(r.body_text()))?;
    let filter = query.into_filter()?;

    let transactions = TransactionRepository::new((*state.db).clone())
        .list(&scope, filter)
        .await?;

    Ok(Json(transactions))
}

/// POST `/transactions` - Create one transaction.
async fn create_transaction(
    State(state): State<AppState>,
    CallerScope(scope): CallerScope,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let body = json_body(payload)?;
    let input = TransactionDraft::from_json(&body)
        .validate(None)
        .map_err(TransactionError::Invalid)?;

    let created = TransactionRepository::new((*state.db).clone())
        .create(&scope, input)
        .await?;

    Ok((StatusCode::CREATED, Json(created)))
}

/// GET `/transactions/{transaction_id}` - Retrieve one transaction.
async fn get_transaction(
    State(state): State<AppState>,
    CallerScope(scope): CallerScope,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let transaction_id = path_id(path)?;

    let transaction = TransactionRepository::new((*state.db).clone())
        .get(&scope, transaction_id)
        .await?;

    Ok(Json(transaction))
}

/// DELETE `/transactions/{transaction_id}` - Delete a transaction and its splits.
async fn delete_transaction(
    State(state): State<AppState>,
    CallerScope(scope): CallerScope,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let transaction_id = path_id(path)?;

    TransactionRepository::new((*state.db).clone())
        .delete(&scope, transaction_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// POST `/transactions/bulk-upload` - Import a CSV file, all or nothing.
async fn bulk_upload(
    State(state): State<AppState>,
    CallerScope(scope): CallerScope,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let mut multipart = multipart.map_err(|_| ImportError::MissingFile)?;

    let mut file = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ImportError::Unreadable(e.body_text()))?
    {
        if field.name() == Some("file") {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ImportError::Unreadable(e.body_text()))?;
            file = Some(bytes);
            break;
        }
    }
    let file = file.ok_or(ImportError::MissingFile)?;

    let rows = ImportService::parse(&file)?;
    info!(rows = rows.len(), bytes = file.len(), "Parsed bulk upload");

    let created = TransactionRepository::new((*state.db).clone())
        .import(&scope, rows)
        .await?;

    Ok((StatusCode::CREATED, Json(json!({ "created": created }))))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header::CONTENT_TYPE};

    use crate::routes::test_support::{app, authed, send, state, token};

    #[tokio::test]
    async fn test_list_without_token_is_unauthorized() {
        let request = Request::builder()
            .uri("/api/v1/transactions")
            .body(Body::empty())
            .unwrap();

        let (status, json) = send(app(&state()), request).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["error"], "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn test_unknown_role_is_unauthorized() {
        let state = state();
        let token = token(&state, "JANITOR");
        let request = authed("GET", "/api/v1/transactions", &token)
            .body(Body::empty())
            .unwrap();

        let (status, json) = send(app(&state), request).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["error"], "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn test_invalid_direction_filter_is_rejected() {
        let state = state();
        let token = token(&state, "SUPER_USER");
        let request = authed("GET", "/api/v1/transactions?direction=SIDEWAYS", &token)
            .body(Body::empty())
            .unwrap();

        let (status, json) = send(app(&state), request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["message"], "\"SIDEWAYS\" is not a valid choice.");
    }

    #[tokio::test]
    async fn test_create_reports_every_invalid_field() {
        let state = state();
        let token = token(&state, "SUPER_USER");
        let request = authed("POST", "/api/v1/transactions", &token)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"direction":"CREDIT","amount":"abc"}"#))
            .unwrap();

        let (status, json) = send(app(&state), request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "VALIDATION_ERROR");
        let fields: Vec<&str> = json["details"]
            .as_array()
            .unwrap()
            .iter()
            .map(|d| d["field"].as_str().unwrap())
            .collect();
        assert!(fields.contains(&"company"));
        assert!(fields.contains(&"amount"));
        assert!(!fields.contains(&"direction"));
    }

    #[tokio::test]
    async fn test_bulk_upload_without_file_field() {
        let state = state();
        let token = token(&state, "SUPER_USER");
        let body = "--XBOUNDARY\r\n\
                    Content-Disposition: form-data; name=\"other\"\r\n\r\n\
                    value\r\n\
                    --XBOUNDARY--\r\n";
        let request = authed("POST", "/api/v1/transactions/bulk-upload", &token)
            .header(CONTENT_TYPE, "multipart/form-data; boundary=XBOUNDARY")
            .body(Body::from(body))
            .unwrap();

        let (status, json) = send(app(&state), request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["message"], "No file uploaded");
        assert_eq!(json["details"][0]["field"], "file");
    }

    #[tokio::test]
    async fn test_bulk_upload_invalid_row_is_rejected_before_database() {
        let state = state();
        let token = token(&state, "SUPER_USER");
        let csv = "company,bank_account,cost_centre,transaction_type,direction,amount,date,notes\n\
                   not-a-uuid,,,,CREDIT,10.00,2025-01-01,\n";
        let body = format!(
            "--XBOUNDARY\r\n\
             Content-Disposition: form-data; name=\"file\"; filename=\"tx.csv\"\r\n\
             Content-Type: text/csv\r\n\r\n\
             {csv}\r\n\
             --XBOUNDARY--\r\n"
        );
        let request = authed("POST", "/api/v1/transactions/bulk-upload", &token)
            .header(CONTENT_TYPE, "multipart/form-data; boundary=XBOUNDARY")
            .body(Body::from(body))
            .unwrap();

        let (status, json) = send(app(&state), request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let details = json["details"].as_array().unwrap();
        assert!(details.iter().all(|d| d["row"] == 1));
        assert_eq!(details[0]["field"], "company");
    }
}

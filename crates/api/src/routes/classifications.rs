//! Classification routes: split a transaction across cost centres, entities and types.

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use igen_core::classification::ClassificationService;
use igen_db::ClassificationRepository;
use igen_shared::AppError;
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use super::transactions::{json_body, path_id};
use crate::{AppState, error::ApiError, extractors::CallerScope};

/// Creates the classification routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/transactions/classified",
            get(list_classifications).post(classify),
        )
        .route(
            "/transactions/{transaction_id}/classified",
            get(list_for_transaction).post(classify_transaction),
        )
}

/// Query parameters for listing classifications.
#[derive(Debug, Deserialize)]
pub struct ListClassificationsQuery {
    /// Restrict to one transaction.
    pub transaction: Option<Uuid>,
}

/// GET `/transactions/classified` - List active splits visible to the caller.
async fn list_classifications(
    State(state): State<AppState>,
    CallerScope(scope): CallerScope,
    query: Result<Query<ListClassificationsQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(query) = query.map_err(|r| AppError::Validation(r.body_text()))?;

    let rows = ClassificationRepository::new((*state.db).clone())
        .list(&scope, query.transaction)
        .await?;

    Ok(Json(rows))
}

/// GET `/transactions/{transaction_id}/classified` - Splits of one transaction.
async fn list_for_transaction(
    State(state): State<AppState>,
    CallerScope(scope): CallerScope,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let transaction_id = path_id(path)?;

    let rows = ClassificationRepository::new((*state.db).clone())
        .list_for_transaction(&scope, transaction_id)
        .await?;

    Ok(Json(rows))
}

/// POST `/transactions/classified` - Classify the transaction named by the first row.
async fn classify(
    State(state): State<AppState>,
    CallerScope(scope): CallerScope,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let rows = ClassificationService::decode_rows(json_body(payload)?)?;
    let transaction_id = ClassificationService::target_transaction(&rows)?;

    let created = ClassificationRepository::new((*state.db).clone())
        .classify(&scope, transaction_id, &rows)
        .await?;

    Ok((StatusCode::CREATED, Json(created)))
}

/// POST `/transactions/{transaction_id}/classified` - Classify the transaction in the path.
async fn classify_transaction(
    State(state): State<AppState>,
    CallerScope(scope): CallerScope,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let transaction_id = path_id(path)?;
    let rows = ClassificationService::decode_rows(json_body(payload)?)?;

    let created = ClassificationRepository::new((*state.db).clone())
        .classify(&scope, transaction_id, &rows)
        .await?;

    Ok((StatusCode::CREATED, Json(created)))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header::CONTENT_TYPE};

    use crate::routes::test_support::{app, authed, send, state, token};

    async fn post_json(uri: &str, body: &str) -> (StatusCode, serde_json::Value) {
        let state = state();
        let token = token(&state, "SUPER_USER");
        let request = authed("POST", uri, &token)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        send(app(&state), request).await
    }

    #[tokio::test]
    async fn test_classify_without_token_is_unauthorized() {
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/transactions/classified")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from("[]"))
            .unwrap();

        let (status, json) = send(app(&state()), request).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["error"], "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn test_empty_list_is_rejected() {
        let (status, json) = post_json("/api/v1/transactions/classified", "[]").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "VALIDATION_ERROR");
        assert_eq!(json["message"], "Expected a non-empty list of classifications.");
    }

    #[tokio::test]
    async fn test_object_body_is_rejected() {
        let (status, json) = post_json(
            "/api/v1/transactions/classified",
            r#"{"transaction":"00000000-0000-0000-0000-000000000000"}"#,
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_empty_list_on_path_form_is_rejected() {
        let uri = format!("/api/v1/transactions/{}/classified", uuid::Uuid::new_v4());
        let (status, json) = post_json(&uri, "[]").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["message"], "Expected a non-empty list of classifications.");
    }

    #[tokio::test]
    async fn test_flat_form_needs_transaction_on_first_row() {
        let (status, json) =
            post_json("/api/v1/transactions/classified", r#"[{"amount":"10.00"}]"#).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["details"][0]["row"], 0);
        assert_eq!(json["details"][0]["field"], "transaction");
    }

    #[tokio::test]
    async fn test_malformed_json_is_a_validation_error() {
        let (status, json) = post_json("/api/v1/transactions/classified", "[{").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "VALIDATION_ERROR");
    }
}

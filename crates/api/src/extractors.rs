//! Request extractors.

use axum::{extract::FromRequestParts, http::request::Parts};
use igen_core::access::{AccessScope, Role};
use igen_db::MembershipRepository;
use igen_shared::AppError;
use igen_shared::types::UserId;

use crate::{AppState, error::ApiError, middleware::AuthUser};

/// The caller's access scope, resolved once per request.
///
/// Built from the token's role and, for roles other than `SUPER_USER`, the
/// caller's company memberships.
#[derive(Debug, Clone)]
pub struct CallerScope(pub AccessScope);

impl FromRequestParts<AppState> for CallerScope {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth = AuthUser::from_request_parts(parts, state).await?;
        let role: Role = auth.role().parse()?;

        let scope = MembershipRepository::new((*state.db).clone())
            .scope_for(UserId::from_uuid(auth.user_id()), role)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(Self(scope))
    }
}

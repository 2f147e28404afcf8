//! Membership repository: which companies a user belongs to.

use igen_core::access::{AccessScope, Role};
use igen_shared::types::{CompanyId, UserId};
use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QuerySelect};
use uuid::Uuid;

use crate::entities::user_companies;

/// Membership repository.
#[derive(Debug, Clone)]
pub struct MembershipRepository {
    db: DatabaseConnection,
}

impl MembershipRepository {
    /// Creates a new membership repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists the companies a user belongs to.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn companies_for(&self, user_id: UserId) -> Result<Vec<CompanyId>, DbErr> {
        let ids: Vec<Uuid> = user_companies::Entity::find()
            .filter(user_companies::Column::UserId.eq(user_id.into_inner()))
            .select_only()
            .column(user_companies::Column::CompanyId)
            .into_tuple()
            .all(&self.db)
            .await?;

        Ok(ids.into_iter().map(CompanyId::from_uuid).collect())
    }

    /// Builds the access scope of a caller.
    ///
    /// `SUPER_USER` needs no memberships, so no query is issued for it.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn scope_for(&self, user_id: UserId, role: Role) -> Result<AccessScope, DbErr> {
        if role.is_super_user() {
            return Ok(AccessScope::super_user());
        }
        let companies = self.companies_for(user_id).await?;
        Ok(AccessScope::new(role, companies))
    }
}

//! Transaction repository for bank transaction database operations.

use std::collections::{BTreeSet, HashMap, HashSet};

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use igen_core::access::{AccessError, AccessScope, ResourceKind};
use igen_core::classification::ClassificationStatus;
use igen_core::import::{ImportError, ImportRow, ImportService};
use igen_core::transaction::{Direction, NewTransaction, OwnedReference, TransactionError};
use igen_shared::AppError;
use igen_shared::types::CompanyId;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    ModelTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::Serialize;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::classification::classification_counts;
use super::scope::company_condition;
use crate::entities::sea_orm_active_enums::TransactionDirection;
use crate::entities::{bank_accounts, companies, cost_centres, transaction_types, transactions};

/// Error types for transaction repository operations.
#[derive(Debug, thiserror::Error)]
pub enum TransactionRepoError {
    /// Domain validation or lookup failure.
    #[error(transparent)]
    Domain(#[from] TransactionError),

    /// Row outside the caller's scope.
    #[error(transparent)]
    Access(#[from] AccessError),

    /// Bulk import failure.
    #[error(transparent)]
    Import(#[from] ImportError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<TransactionRepoError> for AppError {
    fn from(err: TransactionRepoError) -> Self {
        match err {
            TransactionRepoError::Domain(e) => e.into(),
            TransactionRepoError::Access(e) => e.into(),
            TransactionRepoError::Import(e) => e.into(),
            TransactionRepoError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// Filter options for listing transactions.
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    /// Filter by company.
    pub company: Option<Uuid>,
    /// Filter by direction.
    pub direction: Option<Direction>,
    /// Filter by date range start (inclusive).
    pub date_from: Option<NaiveDate>,
    /// Filter by date range end (inclusive).
    pub date_to: Option<NaiveDate>,
}

/// Transaction read view with denormalised names and classification state.
#[derive(Debug, Clone, Serialize)]
pub struct TransactionView {
    /// Transaction ID.
    pub id: Uuid,
    /// Company ID.
    pub company: Uuid,
    /// Company name.
    pub company_name: String,
    /// Bank account ID.
    pub bank_account: Uuid,
    /// Bank name of the account.
    pub bank_name: String,
    /// Cost centre ID.
    pub cost_centre: Uuid,
    /// Cost centre name.
    pub cost_centre_name: String,
    /// Transaction type ID.
    pub transaction_type: Uuid,
    /// Transaction type name.
    pub transaction_type_name: String,
    /// Direction.
    pub direction: Direction,
    /// Amount.
    pub amount: Decimal,
    /// Booking date.
    pub date: NaiveDate,
    /// Notes.
    pub notes: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<FixedOffset>,
    /// True once at least one split exists.
    pub is_classified: bool,
    /// Derived classification status.
    pub classification_status: ClassificationStatus,
}

impl From<Direction> for TransactionDirection {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Credit => Self::Credit,
            Direction::Debit => Self::Debit,
        }
    }
}

impl From<TransactionDirection> for Direction {
    fn from(direction: TransactionDirection) -> Self {
        match direction {
            TransactionDirection::Credit => Self::Credit,
            TransactionDirection::Debit => Self::Debit,
        }
    }
}

/// Transaction repository for CRUD and bulk import.
#[derive(Debug, Clone)]
pub struct TransactionRepository {
    db: DatabaseConnection,
}

impl TransactionRepository {
    /// Creates a new transaction repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates one transaction.
    ///
    /// # Errors
    ///
    /// Returns `Access` when the company is missing or outside the caller's
    /// scope, and `Domain` when a referenced row is missing or belongs to
    /// another company.
    pub async fn create(
        &self,
        scope: &AccessScope,
        input: NewTransaction,
    ) -> Result<TransactionView, TransactionRepoError> {
        scope.ensure_company(ResourceKind::Transaction, input.company)?;
        if existing_companies(&self.db, [input.company]).await?.is_empty() {
            return Err(AccessError::NotFound {
                resource: ResourceKind::Company,
                id: input.company.into_inner(),
            }
            .into());
        }

        let owners = reference_owners(&self.db, input.references()).await?;
        if let Some((kind, id)) = input
            .foreign_references(|kind, id| owners.get(&(kind, id)).copied())
            .into_iter()
            .next()
        {
            return Err(TransactionError::ReferenceNotFound {
                resource: kind.as_str(),
                id,
            }
            .into());
        }

        let model = active_model(&input).insert(&self.db).await?;
        info!(transaction_id = %model.id, company_id = %model.company_id, "Transaction created");

        let mut views = self.views(vec![model]).await?;
        views
            .pop()
            .ok_or_else(|| DbErr::RecordNotFound("created transaction".to_string()).into())
    }

    /// Lists transactions visible to the caller.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        scope: &AccessScope,
        filter: TransactionFilter,
    ) -> Result<Vec<TransactionView>, TransactionRepoError> {
        let mut query = transactions::Entity::find().filter(company_condition(
            scope,
            ResourceKind::Transaction,
            transactions::Column::CompanyId,
        ));

        if let Some(company) = filter.company {
            query = query.filter(transactions::Column::CompanyId.eq(company));
        }
        if let Some(direction) = filter.direction {
            query = query.filter(
                transactions::Column::Direction.eq(TransactionDirection::from(direction)),
            );
        }
        if let Some(date_from) = filter.date_from {
            query = query.filter(transactions::Column::Date.gte(date_from));
        }
        if let Some(date_to) = filter.date_to {
            query = query.filter(transactions::Column::Date.lte(date_to));
        }

        let models = query
            .order_by_desc(transactions::Column::Date)
            .order_by_desc(transactions::Column::CreatedAt)
            .all(&self.db)
            .await?;

        self.views(models).await
    }

    /// Gets one transaction visible to the caller.
    ///
    /// # Errors
    ///
    /// Returns `Domain(NotFound)` if the transaction does not exist or lies
    /// outside the caller's scope.
    pub async fn get(
        &self,
        scope: &AccessScope,
        id: Uuid,
    ) -> Result<TransactionView, TransactionRepoError> {
        let model = find_scoped(&self.db, scope, id).await?;
        let mut views = self.views(vec![model]).await?;
        views
            .pop()
            .ok_or_else(|| TransactionError::NotFound(id).into())
    }

    /// Deletes a transaction; its classified splits cascade.
    ///
    /// # Errors
    ///
    /// Returns `Domain(NotFound)` if the transaction does not exist or lies
    /// outside the caller's scope.
    pub async fn delete(&self, scope: &AccessScope, id: Uuid) -> Result<(), TransactionRepoError> {
        let model = find_scoped(&self.db, scope, id).await?;
        model.delete(&self.db).await?;
        info!(transaction_id = %id, "Transaction deleted");
        Ok(())
    }

    /// Imports validated CSV rows, all or nothing.
    ///
    /// # Errors
    ///
    /// Returns `Import(InvalidRows)` with every failing row when a company is
    /// missing or out of scope or a reference does not belong to the row's
    /// company. Nothing is inserted in that case.
    pub async fn import(
        &self,
        scope: &AccessScope,
        rows: Vec<ImportRow>,
    ) -> Result<usize, TransactionRepoError> {
        let companies = existing_companies(&self.db, rows.iter().map(|r| r.transaction.company))
            .await?;
        let owners = reference_owners(
            &self.db,
            rows.iter().flat_map(|r| r.transaction.references()),
        )
        .await?;

        if let Err(e) = ImportService::check_rows(
            &rows,
            |company| {
                companies.contains(&company) && scope.allows(ResourceKind::Transaction, company)
            },
            |kind, id| owners.get(&(kind, id)).copied(),
        ) {
            warn!(rows = rows.len(), "Bulk import rejected");
            return Err(e.into());
        }

        let txn = self.db.begin().await?;
        let mut created = 0;
        for row in &rows {
            if let Err(e) = active_model(&row.transaction).insert(&txn).await {
                if let Err(rollback) = txn.rollback().await {
                    error!(error = %rollback, "Rollback failed");
                }
                return Err(e.into());
            }
            created += 1;
        }
        txn.commit().await?;

        info!(created, "Bulk import committed");
        Ok(created)
    }

    /// Attaches names and classification state to transaction rows.
    async fn views(
        &self,
        models: Vec<transactions::Model>,
    ) -> Result<Vec<TransactionView>, TransactionRepoError> {
        if models.is_empty() {
            return Ok(vec![]);
        }

        let ids = |f: fn(&transactions::Model) -> Uuid| -> Vec<Uuid> {
            models.iter().map(f).collect::<BTreeSet<_>>().into_iter().collect()
        };

        let company_names: HashMap<Uuid, String> = companies::Entity::find()
            .filter(companies::Column::Id.is_in(ids(|m| m.company_id)))
            .select_only()
            .column(companies::Column::Id)
            .column(companies::Column::Name)
            .into_tuple::<(Uuid, String)>()
            .all(&self.db)
            .await?
            .into_iter()
            .collect();
        let bank_names: HashMap<Uuid, String> = bank_accounts::Entity::find()
            .filter(bank_accounts::Column::Id.is_in(ids(|m| m.bank_account_id)))
            .select_only()
            .column(bank_accounts::Column::Id)
            .column(bank_accounts::Column::BankName)
            .into_tuple::<(Uuid, String)>()
            .all(&self.db)
            .await?
            .into_iter()
            .collect();
        let cost_centre_names: HashMap<Uuid, String> = cost_centres::Entity::find()
            .filter(cost_centres::Column::Id.is_in(ids(|m| m.cost_centre_id)))
            .select_only()
            .column(cost_centres::Column::Id)
            .column(cost_centres::Column::Name)
            .into_tuple::<(Uuid, String)>()
            .all(&self.db)
            .await?
            .into_iter()
            .collect();
        let type_names: HashMap<Uuid, String> = transaction_types::Entity::find()
            .filter(transaction_types::Column::Id.is_in(ids(|m| m.transaction_type_id)))
            .select_only()
            .column(transaction_types::Column::Id)
            .column(transaction_types::Column::Name)
            .into_tuple::<(Uuid, String)>()
            .all(&self.db)
            .await?
            .into_iter()
            .collect();
        let counts = classification_counts(&self.db, ids(|m| m.id)).await?;

        let name = |names: &HashMap<Uuid, String>, id: Uuid| names.get(&id).cloned().unwrap_or_default();

        Ok(models
            .into_iter()
            .map(|m| {
                let status =
                    ClassificationStatus::from_count(counts.get(&m.id).copied().unwrap_or(0));
                TransactionView {
                    id: m.id,
                    company: m.company_id,
                    company_name: name(&company_names, m.company_id),
                    bank_account: m.bank_account_id,
                    bank_name: name(&bank_names, m.bank_account_id),
                    cost_centre: m.cost_centre_id,
                    cost_centre_name: name(&cost_centre_names, m.cost_centre_id),
                    transaction_type: m.transaction_type_id,
                    transaction_type_name: name(&type_names, m.transaction_type_id),
                    direction: m.direction.into(),
                    amount: m.amount,
                    date: m.date,
                    notes: m.notes,
                    created_at: m.created_at,
                    is_classified: status.is_classified(),
                    classification_status: status,
                }
            })
            .collect())
    }
}

/// Loads a transaction if it exists and lies inside the caller's scope.
pub(crate) async fn find_scoped<C: ConnectionTrait>(
    db: &C,
    scope: &AccessScope,
    id: Uuid,
) -> Result<transactions::Model, TransactionRepoError> {
    transactions::Entity::find_by_id(id)
        .filter(company_condition(
            scope,
            ResourceKind::Transaction,
            transactions::Column::CompanyId,
        ))
        .one(db)
        .await?
        .ok_or_else(|| TransactionError::NotFound(id).into())
}

fn active_model(input: &NewTransaction) -> transactions::ActiveModel {
    transactions::ActiveModel {
        id: Set(Uuid::new_v4()),
        company_id: Set(input.company.into_inner()),
        bank_account_id: Set(input.bank_account),
        cost_centre_id: Set(input.cost_centre),
        transaction_type_id: Set(input.transaction_type),
        direction: Set(input.direction.into()),
        amount: Set(input.amount),
        date: Set(input.date),
        notes: Set(input.notes.clone()),
        created_at: Set(Utc::now().into()),
    }
}

/// Returns the subset of `ids` that exist as companies.
async fn existing_companies<C: ConnectionTrait>(
    db: &C,
    ids: impl IntoIterator<Item = CompanyId>,
) -> Result<HashSet<CompanyId>, DbErr> {
    let ids: BTreeSet<Uuid> = ids.into_iter().map(CompanyId::into_inner).collect();
    if ids.is_empty() {
        return Ok(HashSet::new());
    }
    let found: Vec<Uuid> = companies::Entity::find()
        .filter(companies::Column::Id.is_in(ids))
        .select_only()
        .column(companies::Column::Id)
        .into_tuple()
        .all(db)
        .await?;
    Ok(found.into_iter().map(CompanyId::from_uuid).collect())
}

/// Resolves the owning company of each referenced row in one query per kind.
async fn reference_owners<C: ConnectionTrait>(
    db: &C,
    refs: impl IntoIterator<Item = (OwnedReference, Uuid)>,
) -> Result<HashMap<(OwnedReference, Uuid), CompanyId>, DbErr> {
    let mut by_kind: HashMap<OwnedReference, BTreeSet<Uuid>> = HashMap::new();
    for (kind, id) in refs {
        by_kind.entry(kind).or_default().insert(id);
    }

    let mut owners = HashMap::new();
    for (kind, ids) in by_kind {
        let pairs: Vec<(Uuid, Uuid)> = match kind {
            OwnedReference::BankAccount => {
                bank_accounts::Entity::find()
                    .filter(bank_accounts::Column::Id.is_in(ids))
                    .select_only()
                    .column(bank_accounts::Column::Id)
                    .column(bank_accounts::Column::CompanyId)
                    .into_tuple()
                    .all(db)
                    .await?
            }
            OwnedReference::CostCentre => {
                cost_centres::Entity::find()
                    .filter(cost_centres::Column::Id.is_in(ids))
                    .select_only()
                    .column(cost_centres::Column::Id)
                    .column(cost_centres::Column::CompanyId)
                    .into_tuple()
                    .all(db)
                    .await?
            }
            OwnedReference::TransactionType => {
                transaction_types::Entity::find()
                    .filter(transaction_types::Column::Id.is_in(ids))
                    .select_only()
                    .column(transaction_types::Column::Id)
                    .column(transaction_types::Column::CompanyId)
                    .into_tuple()
                    .all(db)
                    .await?
            }
        };
        owners.extend(
            pairs
                .into_iter()
                .map(|(id, company)| ((kind, id), CompanyId::from_uuid(company))),
        );
    }
    Ok(owners)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_mapping() {
        assert_eq!(
            TransactionDirection::from(Direction::Credit),
            TransactionDirection::Credit
        );
        assert_eq!(Direction::from(TransactionDirection::Debit), Direction::Debit);
    }

    #[test]
    fn test_repo_errors_map_to_app_errors() {
        let app: AppError = TransactionRepoError::from(TransactionError::NotFound(Uuid::nil())).into();
        assert_eq!(app.status_code(), 404);

        let app: AppError =
            TransactionRepoError::from(DbErr::Custom("connection reset".into())).into();
        assert_eq!(app.error_code(), "DATABASE_ERROR");

        let app: AppError = TransactionRepoError::from(ImportError::Empty).into();
        assert_eq!(app.status_code(), 400);
    }

    #[test]
    fn test_active_model_copies_input() {
        let input = NewTransaction {
            company: CompanyId::new(),
            bank_account: Uuid::new_v4(),
            cost_centre: Uuid::new_v4(),
            transaction_type: Uuid::new_v4(),
            direction: Direction::Debit,
            amount: Decimal::new(100_000, 2),
            date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            notes: None,
        };
        let model = active_model(&input);
        assert_eq!(model.company_id, Set(input.company.into_inner()));
        assert_eq!(model.direction, Set(TransactionDirection::Debit));
        assert_eq!(model.amount, Set(Decimal::new(100_000, 2)));
    }
}

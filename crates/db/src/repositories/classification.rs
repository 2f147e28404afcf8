//! Classification repository: replaces a transaction's splits atomically.

use std::collections::{BTreeSet, HashMap, HashSet};

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use igen_core::access::{AccessScope, ResourceKind};
use igen_core::classification::{
    ClassificationError, ClassificationService, ReferenceKind, SplitRowInput, ValidatedSplit,
};
use igen_shared::AppError;
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction, DbErr,
    EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::Serialize;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::scope::{classification_condition, company_condition};
use super::transaction::{TransactionRepoError, find_scoped};
use crate::entities::{
    assets, classified_transactions, contracts, cost_centres, counterparties, transaction_types,
    transactions,
};

/// Error types for classification repository operations.
#[derive(Debug, thiserror::Error)]
pub enum ClassificationRepoError {
    /// Validation or lookup failure.
    #[error(transparent)]
    Domain(#[from] ClassificationError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<ClassificationRepoError> for AppError {
    fn from(err: ClassificationRepoError) -> Self {
        match err {
            ClassificationRepoError::Domain(e) => e.into(),
            ClassificationRepoError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// A stored classification row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassificationView {
    /// Row id, fresh on every classify call.
    pub classification_id: Uuid,
    /// Parent transaction.
    pub transaction: Uuid,
    /// Cost centre.
    pub cost_centre: Uuid,
    /// Counterparty entity.
    pub entity: Uuid,
    /// Transaction type.
    pub transaction_type: Uuid,
    /// Optional asset.
    pub asset: Option<Uuid>,
    /// Optional contract.
    pub contract: Option<Uuid>,
    /// Split amount.
    pub amount: Decimal,
    /// Value date.
    pub value_date: NaiveDate,
    /// Remarks.
    pub remarks: Option<String>,
    /// Whether this row is the active classification.
    pub is_active_classification: bool,
    /// Creation timestamp.
    pub created_at: DateTime<FixedOffset>,
}

impl From<classified_transactions::Model> for ClassificationView {
    fn from(m: classified_transactions::Model) -> Self {
        Self {
            classification_id: m.classification_id,
            transaction: m.transaction_id,
            cost_centre: m.cost_centre_id,
            entity: m.entity_id,
            transaction_type: m.transaction_type_id,
            asset: m.asset_id,
            contract: m.contract_id,
            amount: m.amount,
            value_date: m.value_date,
            remarks: m.remarks,
            is_active_classification: m.is_active_classification,
            created_at: m.created_at,
        }
    }
}

/// Classification repository.
#[derive(Debug, Clone)]
pub struct ClassificationRepository {
    db: DatabaseConnection,
}

impl ClassificationRepository {
    /// Creates a new classification repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Replaces every split of a transaction with `rows`.
    ///
    /// Validation runs inside the database transaction before any write:
    /// the transaction must be visible to the caller, the rows must pass
    /// [`ClassificationService::validate_rows`] against its amount, and every
    /// referenced row must exist. Then existing splits are deleted and the
    /// new ones inserted in submission order with fresh ids.
    ///
    /// # Errors
    ///
    /// Returns `Domain` for any validation or lookup failure and `Database`
    /// for store failures. Nothing is written in either case.
    pub async fn classify(
        &self,
        scope: &AccessScope,
        transaction_id: Uuid,
        rows: &[SplitRowInput],
    ) -> Result<Vec<ClassificationView>, ClassificationRepoError> {
        let txn = self.db.begin().await?;

        match Self::replace_splits(&txn, scope, transaction_id, rows).await {
            Ok(created) => {
                txn.commit().await?;
                info!(
                    transaction_id = %transaction_id,
                    rows = created.len(),
                    "Transaction classified"
                );
                Ok(created)
            }
            Err(e) => {
                let rollback = txn.rollback().await;
                Err(Self::rejected(transaction_id, e, rollback))
            }
        }
    }

    /// Logs a failed classification and returns its original error, even
    /// when the rollback fails as well.
    fn rejected(
        transaction_id: Uuid,
        err: ClassificationRepoError,
        rollback: Result<(), DbErr>,
    ) -> ClassificationRepoError {
        if let Err(rollback) = rollback {
            error!(transaction_id = %transaction_id, error = %rollback, "Rollback failed");
        }
        if let ClassificationRepoError::Domain(domain) = &err {
            warn!(transaction_id = %transaction_id, error = %domain, "Classification rejected");
        }
        err
    }

    async fn replace_splits(
        txn: &DatabaseTransaction,
        scope: &AccessScope,
        transaction_id: Uuid,
        rows: &[SplitRowInput],
    ) -> Result<Vec<ClassificationView>, ClassificationRepoError> {
        // Row lock serialises concurrent classifications of one transaction.
        let parent = transactions::Entity::find_by_id(transaction_id)
            .filter(company_condition(
                scope,
                ResourceKind::Transaction,
                transactions::Column::CompanyId,
            ))
            .lock_exclusive()
            .one(txn)
            .await?
            .ok_or(ClassificationError::TransactionNotFound(transaction_id))?;

        let splits = ClassificationService::validate_rows(transaction_id, parent.amount, rows)?;

        let existing = existing_references(txn, &splits).await?;
        ClassificationService::check_references(&splits, |kind, id| {
            existing.contains(&(kind, id))
        })?;

        classified_transactions::Entity::delete_many()
            .filter(classified_transactions::Column::TransactionId.eq(transaction_id))
            .exec(txn)
            .await?;

        let now: DateTime<FixedOffset> = Utc::now().into();
        let mut created: Vec<ClassificationView> = Vec::with_capacity(splits.len());
        for (line_no, split) in (0_i32..).zip(splits) {
            let model = classified_transactions::ActiveModel {
                classification_id: Set(Uuid::new_v4()),
                transaction_id: Set(transaction_id),
                line_no: Set(line_no),
                cost_centre_id: Set(split.cost_centre),
                entity_id: Set(split.entity),
                transaction_type_id: Set(split.transaction_type),
                asset_id: Set(split.asset),
                contract_id: Set(split.contract),
                amount: Set(split.amount),
                value_date: Set(split.value_date),
                remarks: Set(split.remarks),
                is_active_classification: Set(true),
                created_at: Set(now),
            }
            .insert(txn)
            .await?;
            created.push(model.into());
        }

        Ok(created)
    }

    /// Lists active classification rows visible to the caller.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        scope: &AccessScope,
        transaction_id: Option<Uuid>,
    ) -> Result<Vec<ClassificationView>, ClassificationRepoError> {
        let mut query = classified_transactions::Entity::find()
            .filter(classification_condition(scope))
            .filter(classified_transactions::Column::IsActiveClassification.eq(true));

        if let Some(transaction_id) = transaction_id {
            query = query.filter(classified_transactions::Column::TransactionId.eq(transaction_id));
        }

        let rows = query
            .order_by_asc(classified_transactions::Column::TransactionId)
            .order_by_asc(classified_transactions::Column::LineNo)
            .all(&self.db)
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Lists the active splits of one transaction.
    ///
    /// # Errors
    ///
    /// Returns `TransactionNotFound` if the transaction does not exist or
    /// lies outside the caller's scope.
    pub async fn list_for_transaction(
        &self,
        scope: &AccessScope,
        transaction_id: Uuid,
    ) -> Result<Vec<ClassificationView>, ClassificationRepoError> {
        self.ensure_visible(scope, transaction_id).await?;
        self.list(scope, Some(transaction_id)).await
    }

    /// Returns true once the transaction has at least one split.
    ///
    /// # Errors
    ///
    /// Returns `TransactionNotFound` if the transaction does not exist or
    /// lies outside the caller's scope.
    pub async fn is_classified(
        &self,
        scope: &AccessScope,
        transaction_id: Uuid,
    ) -> Result<bool, ClassificationRepoError> {
        self.ensure_visible(scope, transaction_id).await?;
        let counts = classification_counts(&self.db, [transaction_id]).await?;
        Ok(counts.get(&transaction_id).is_some_and(|n| *n > 0))
    }

    async fn ensure_visible(
        &self,
        scope: &AccessScope,
        transaction_id: Uuid,
    ) -> Result<(), ClassificationRepoError> {
        find_scoped(&self.db, scope, transaction_id)
            .await
            .map(|_| ())
            .map_err(|e| match e {
                TransactionRepoError::Database(e) => ClassificationRepoError::Database(e),
                _ => ClassificationError::TransactionNotFound(transaction_id).into(),
            })
    }
}

/// Counts active splits per transaction.
///
/// Transactions without splits are absent from the map.
pub(crate) async fn classification_counts<C: ConnectionTrait>(
    db: &C,
    transaction_ids: impl IntoIterator<Item = Uuid>,
) -> Result<HashMap<Uuid, u64>, DbErr> {
    let ids: BTreeSet<Uuid> = transaction_ids.into_iter().collect();
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows: Vec<(Uuid, i64)> = classified_transactions::Entity::find()
        .select_only()
        .column(classified_transactions::Column::TransactionId)
        .column_as(
            Expr::col(classified_transactions::Column::ClassificationId).count(),
            "count",
        )
        .filter(classified_transactions::Column::TransactionId.is_in(ids))
        .filter(classified_transactions::Column::IsActiveClassification.eq(true))
        .group_by(classified_transactions::Column::TransactionId)
        .into_tuple()
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(id, count)| (id, u64::try_from(count).unwrap_or(0)))
        .collect())
}

/// Looks up which referenced rows exist, one query per reference kind.
async fn existing_references<C: ConnectionTrait>(
    db: &C,
    splits: &[ValidatedSplit],
) -> Result<HashSet<(ReferenceKind, Uuid)>, DbErr> {
    let mut found = HashSet::new();

    for (kind, ids) in ClassificationService::referenced_ids(splits) {
        let ids: Vec<Uuid> = ids.into_iter().collect();
        let existing: Vec<Uuid> = match kind {
            ReferenceKind::CostCentre => {
                cost_centres::Entity::find()
                    .filter(cost_centres::Column::Id.is_in(ids))
                    .select_only()
                    .column(cost_centres::Column::Id)
                    .into_tuple()
                    .all(db)
                    .await?
            }
            ReferenceKind::Entity => {
                counterparties::Entity::find()
                    .filter(counterparties::Column::Id.is_in(ids))
                    .select_only()
                    .column(counterparties::Column::Id)
                    .into_tuple()
                    .all(db)
                    .await?
            }
            ReferenceKind::TransactionType => {
                transaction_types::Entity::find()
                    .filter(transaction_types::Column::Id.is_in(ids))
                    .select_only()
                    .column(transaction_types::Column::Id)
                    .into_tuple()
                    .all(db)
                    .await?
            }
            ReferenceKind::Asset => {
                assets::Entity::find()
                    .filter(assets::Column::Id.is_in(ids))
                    .select_only()
                    .column(assets::Column::Id)
                    .into_tuple()
                    .all(db)
                    .await?
            }
            ReferenceKind::Contract => {
                contracts::Entity::find()
                    .filter(contracts::Column::Id.is_in(ids))
                    .select_only()
                    .column(contracts::Column::Id)
                    .into_tuple()
                    .all(db)
                    .await?
            }
        };
        found.extend(existing.into_iter().map(|id| (kind, id)));
    }

    Ok(found)
}

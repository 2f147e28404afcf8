//! Applies access scopes to `SeaORM` queries.
//!
//! Every repository query goes through these helpers so that the company
//! boundary is enforced in one place.

use igen_core::access::{AccessScope, ResourceKind, ScopeFilter, Tenancy};
use sea_orm::sea_query::Query;
use sea_orm::{ColumnTrait, Condition};

use crate::entities::{classified_transactions, transactions};

/// Builds the condition restricting `company_column` to the caller's scope.
#[must_use]
pub fn company_condition<C: ColumnTrait>(
    scope: &AccessScope,
    resource: ResourceKind,
    company_column: C,
) -> Condition {
    match scope.filter_for(resource).company_uuids() {
        None => Condition::all(),
        Some(companies) => Condition::all().add(company_column.is_in(companies)),
    }
}

/// Builds the condition restricting classified rows to visible parent transactions.
#[must_use]
pub fn classification_condition(scope: &AccessScope) -> Condition {
    let resource = ResourceKind::ClassifiedTransaction;
    debug_assert_eq!(resource.tenancy(), Tenancy::ViaTransaction);

    match scope.filter_for(resource) {
        ScopeFilter::Unrestricted => Condition::all(),
        filter @ ScopeFilter::Companies(_) => {
            let companies = filter.company_uuids().unwrap_or_default();
            Condition::all().add(
                classified_transactions::Column::TransactionId.in_subquery(
                    Query::select()
                        .column(transactions::Column::Id)
                        .from(transactions::Entity)
                        .and_where(transactions::Column::CompanyId.is_in(companies))
                        .to_owned(),
                ),
            )
        }
    }
}

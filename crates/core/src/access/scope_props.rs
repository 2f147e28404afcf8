//! Property-based tests for access scope resolution.

use proptest::prelude::*;
use uuid::Uuid;

use igen_shared::types::CompanyId;

use super::role::Role;
use super::scope::{AccessScope, ResourceKind, ScopeFilter};

fn company_id() -> impl Strategy<Value = CompanyId> {
    any::<u128>().prop_map(|v| CompanyId::from_uuid(Uuid::from_u128(v)))
}

fn restricted_role() -> impl Strategy<Value = Role> {
    prop_oneof![
        Just(Role::CenterHead),
        Just(Role::Accountant),
        Just(Role::PropertyManager),
    ]
}

fn tenant_resource() -> impl Strategy<Value = ResourceKind> {
    prop_oneof![
        Just(ResourceKind::Company),
        Just(ResourceKind::BankAccount),
        Just(ResourceKind::CostCentre),
        Just(ResourceKind::TransactionType),
        Just(ResourceKind::Asset),
        Just(ResourceKind::Contract),
        Just(ResourceKind::Transaction),
        Just(ResourceKind::ClassifiedTransaction),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// A restricted caller sees a company's rows iff it is a member of that company.
    #[test]
    fn prop_restricted_scope_matches_membership(
        role in restricted_role(),
        resource in tenant_resource(),
        members in prop::collection::vec(company_id(), 0..5),
        probe in company_id(),
    ) {
        let scope = AccessScope::new(role, members.clone());
        prop_assert_eq!(scope.allows(resource, probe), members.contains(&probe));
        for member in &members {
            prop_assert!(scope.allows(resource, *member));
        }
    }

    /// SUPER_USER is never restricted, whatever its memberships.
    #[test]
    fn prop_super_user_unrestricted(
        resource in tenant_resource(),
        members in prop::collection::vec(company_id(), 0..5),
    ) {
        let scope = AccessScope::new(Role::SuperUser, members);
        prop_assert_eq!(scope.filter_for(resource), ScopeFilter::Unrestricted);
    }
}

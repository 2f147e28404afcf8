//! Access scope resolution.

use std::collections::BTreeSet;
use std::fmt;

use igen_shared::types::CompanyId;
use uuid::Uuid;

use super::error::AccessError;
use super::role::Role;

/// Resource kinds that are filtered by company.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// A tenant company.
    Company,
    /// A company bank account.
    BankAccount,
    /// A company cost centre.
    CostCentre,
    /// A company transaction type.
    TransactionType,
    /// A counterparty shared by all companies.
    Entity,
    /// A vendor counterparty.
    Vendor,
    /// A company asset.
    Asset,
    /// A company contract.
    Contract,
    /// A bank transaction.
    Transaction,
    /// A classified split of a bank transaction.
    ClassifiedTransaction,
}

/// How a resource kind relates to a company.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tenancy {
    /// The row carries its own company column.
    Direct,
    /// The row is scoped through its parent transaction's company.
    ViaTransaction,
    /// The row has no tenant boundary.
    Shared,
}

impl ResourceKind {
    /// Returns how the resource is tied to a company.
    #[must_use]
    pub const fn tenancy(self) -> Tenancy {
        match self {
            Self::Company
            | Self::BankAccount
            | Self::CostCentre
            | Self::TransactionType
            | Self::Vendor
            | Self::Asset
            | Self::Contract
            | Self::Transaction => Tenancy::Direct,
            Self::ClassifiedTransaction => Tenancy::ViaTransaction,
            // Entities have no company column; every caller sees all of them.
            Self::Entity => Tenancy::Shared,
        }
    }

    /// Roles that see every company's rows of this kind, besides `SUPER_USER`.
    #[must_use]
    pub const fn elevated_roles(self) -> &'static [Role] {
        match self {
            Self::Vendor => &[Role::PropertyManager],
            _ => &[],
        }
    }

    /// Returns the display name of the resource.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Company => "Company",
            Self::BankAccount => "BankAccount",
            Self::CostCentre => "CostCentre",
            Self::TransactionType => "TransactionType",
            Self::Entity => "Entity",
            Self::Vendor => "Vendor",
            Self::Asset => "Asset",
            Self::Contract => "Contract",
            Self::Transaction => "Transaction",
            Self::ClassifiedTransaction => "ClassifiedTransaction",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Row filter produced by an [`AccessScope`] for one resource kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeFilter {
    /// No company restriction.
    Unrestricted,
    /// Only rows owned by one of these companies.
    Companies(BTreeSet<CompanyId>),
}

impl ScopeFilter {
    /// Returns true when a row owned by `company` passes the filter.
    #[must_use]
    pub fn allows(&self, company: CompanyId) -> bool {
        match self {
            Self::Unrestricted => true,
            Self::Companies(set) => set.contains(&company),
        }
    }

    /// Returns the company ids as plain UUIDs, `None` when unrestricted.
    #[must_use]
    pub fn company_uuids(&self) -> Option<Vec<Uuid>> {
        match self {
            Self::Unrestricted => None,
            Self::Companies(set) => Some(set.iter().map(|c| c.into_inner()).collect()),
        }
    }
}

/// Per-request access scope: the caller's role and company memberships.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessScope {
    role: Role,
    companies: BTreeSet<CompanyId>,
}

impl AccessScope {
    /// Creates a scope from a role and its memberships.
    #[must_use]
    pub fn new(role: Role, companies: impl IntoIterator<Item = CompanyId>) -> Self {
        Self {
            role,
            companies: companies.into_iter().collect(),
        }
    }

    /// Scope of a `SUPER_USER`, which needs no memberships.
    #[must_use]
    pub fn super_user() -> Self {
        Self::new(Role::SuperUser, [])
    }

    /// Returns the caller's role.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// Returns the caller's company memberships.
    #[must_use]
    pub const fn companies(&self) -> &BTreeSet<CompanyId> {
        &self.companies
    }

    /// Resolves the row filter for a resource kind.
    #[must_use]
    pub fn filter_for(&self, resource: ResourceKind) -> ScopeFilter {
        if self.role.is_super_user()
            || resource.tenancy() == Tenancy::Shared
            || resource.elevated_roles().contains(&self.role)
        {
            ScopeFilter::Unrestricted
        } else {
            ScopeFilter::Companies(self.companies.clone())
        }
    }

    /// Returns true when the caller may see `resource` rows of `company`.
    #[must_use]
    pub fn allows(&self, resource: ResourceKind, company: CompanyId) -> bool {
        self.filter_for(resource).allows(company)
    }

    /// Checks that the caller may write rows for `company`.
    ///
    /// An out-of-scope company is reported as a missing company.
    pub fn ensure_company(
        &self,
        resource: ResourceKind,
        company: CompanyId,
    ) -> Result<(), AccessError> {
        if self.allows(resource, company) {
            Ok(())
        } else {
            Err(AccessError::NotFound {
                resource: ResourceKind::Company,
                id: company.into_inner(),
            })
        }
    }
}

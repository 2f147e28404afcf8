//! Role-based access scoping.
//!
//! Every resource read or write goes through one resolver: the caller's role
//! and company memberships decide which companies' rows are visible for a
//! given resource kind. Rows outside the scope are reported as not found.

pub mod error;
pub mod role;
pub mod scope;

#[cfg(test)]
mod scope_props;

pub use error::AccessError;
pub use role::Role;
pub use scope::{AccessScope, ResourceKind, ScopeFilter, Tenancy};

//! Transaction classification.
//!
//! A bank transaction is classified by splitting it into one or more rows,
//! each tagged with a cost centre, entity, transaction type and optional
//! asset or contract. The split amounts must add up to the transaction
//! amount exactly. Every write replaces the whole set of rows.

pub mod error;
pub mod service;
pub mod types;

#[cfg(test)]
mod service_props;

pub use error::ClassificationError;
pub use service::ClassificationService;
pub use types::{ClassificationStatus, ReferenceKind, SplitRowInput, ValidatedSplit};

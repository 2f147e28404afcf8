//! Bank transactions.
//!
//! Input validation shared by single creation and bulk import.

pub mod error;
pub mod types;

pub use error::TransactionError;
pub use types::{Direction, NewTransaction, OwnedReference, TransactionDraft};

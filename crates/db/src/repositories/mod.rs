//! Repository layer for database operations.
//!
//! Every repository takes the caller's [`igen_core::access::AccessScope`]
//! and filters through [`scope`].

pub mod classification;
pub mod membership;
pub mod scope;
pub mod transaction;

pub use classification::{ClassificationRepoError, ClassificationRepository, ClassificationView};
pub use membership::MembershipRepository;
pub use transaction::{
    TransactionFilter, TransactionRepoError, TransactionRepository, TransactionView,
};

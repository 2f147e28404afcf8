//! Bulk transaction import from CSV.
//!
//! Every row is validated on its own and all row errors are reported
//! together. A file is imported whole or not at all.

pub mod error;
pub mod service;

pub use error::ImportError;
pub use service::{ImportRow, ImportService, REQUIRED_COLUMNS};

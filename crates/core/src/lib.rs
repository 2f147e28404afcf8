//! Core business logic for igen.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and access decisions live here.
//!
//! # Modules
//!
//! - `access` - Role-based company scoping shared by every resource
//! - `classification` - Splitting a bank transaction into classified entries
//! - `transaction` - Bank transaction input validation
//! - `import` - Bulk CSV transaction import

pub mod access;
pub mod classification;
pub mod import;
pub mod transaction;

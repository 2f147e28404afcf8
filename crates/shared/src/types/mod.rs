//! Common types used across the application.

pub mod amount;
pub mod id;

pub use amount::{format_amount, parse_amount};
pub use id::*;

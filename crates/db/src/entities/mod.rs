//! `SeaORM` entity definitions.

pub mod assets;
pub mod bank_accounts;
pub mod classified_transactions;
pub mod companies;
pub mod contracts;
pub mod cost_centres;
pub mod counterparties;
pub mod sea_orm_active_enums;
pub mod transaction_types;
pub mod transactions;
pub mod user_companies;
pub mod users;

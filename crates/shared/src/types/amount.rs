//! Fixed-point amount helpers.
//!
//! Amounts are stored as `NUMERIC(12, 2)`. Never use floating point for them.

use std::str::FromStr;

use rust_decimal::Decimal;

/// Decimal places kept for every stored amount.
pub const AMOUNT_SCALE: u32 = 2;

/// Total significant digits a stored amount may carry.
pub const AMOUNT_PRECISION: u32 = 12;

/// Parses a decimal amount from user input.
///
/// Surrounding whitespace is ignored. Returns `None` for empty or non-numeric input.
#[must_use]
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .ok()
}

/// Returns true when the value has no more than two meaningful decimal places.
///
/// Trailing zeros do not count, so `10.500` fits.
#[must_use]
pub fn fits_scale(value: Decimal) -> bool {
    value.normalize().scale() <= AMOUNT_SCALE
}

/// Returns true when the value fits `NUMERIC(12, 2)`.
#[must_use]
pub fn fits_precision(value: Decimal) -> bool {
    let limit = Decimal::from(10_i64.pow(AMOUNT_PRECISION - AMOUNT_SCALE));
    value.abs() < limit
}

/// Renders an amount with exactly two decimal places.
#[must_use]
pub fn format_amount(value: &Decimal) -> String {
    format!("{value:.2}")
}

//! Property-based tests for split validation.
//!
//! - Any partition of a total into positive two-place amounts validates
//! - Any perturbation of the total is rejected before schema checks
//! - Amounts up to `Decimal::MAX` are rejected with an error, never a panic

use igen_shared::types::amount::fits_precision;
use proptest::prelude::*;
use rust_decimal::Decimal;
use serde_json::{Value, json};
use uuid::Uuid;

use super::error::ClassificationError;
use super::service::ClassificationService;
use super::types::SplitRowInput;

/// Strategy for split amounts in cents (0.01 to 50,000.00).
fn split_cents() -> impl Strategy<Value = Vec<i64>> {
    prop::collection::vec(1i64..5_000_000i64, 1..12)
}

/// Strategy for arbitrary decimals, from cents up to `Decimal::MAX`.
fn wide_amounts() -> impl Strategy<Value = Vec<Decimal>> {
    let mantissa = prop_oneof![
        1i128..1_000_000_000_000i128,
        1_000_000_000_000i128..=Decimal::MAX.mantissa(),
    ];
    prop::collection::vec((mantissa, 0u32..=2), 1..6).prop_map(|parts| {
        parts
            .into_iter()
            .map(|(m, scale)| Decimal::from_i128_with_scale(m, scale))
            .collect()
    })
}

/// Amount rendered either as a JSON number or as a numeric string.
fn amount_value(cents: i64, as_number: bool) -> Value {
    let text = Decimal::new(cents, 2).to_string();
    if as_number {
        serde_json::from_str(&text).unwrap_or(Value::String(text))
    } else {
        Value::String(text)
    }
}

fn rows_for(transaction: Uuid, cents: &[i64], as_number: bool) -> Vec<SplitRowInput> {
    let cost_centre = Uuid::new_v4().to_string();
    let entity = Uuid::new_v4().to_string();
    let transaction_type = Uuid::new_v4().to_string();
    let body = cents
        .iter()
        .map(|c| {
            json!({
                "transaction": transaction.to_string(),
                "cost_centre": cost_centre,
                "entity": entity,
                "transaction_type": transaction_type,
                "amount": amount_value(*c, as_number),
                "value_date": "2025-06-30",
            })
        })
        .collect();
    ClassificationService::decode_rows(Value::Array(body)).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Splits that partition the total validate, and their sum equals the total exactly.
    #[test]
    fn prop_partition_validates(cents in split_cents(), as_number in any::<bool>()) {
        let transaction = Uuid::new_v4();
        let total = Decimal::new(cents.iter().sum(), 2);
        let rows = rows_for(transaction, &cents, as_number);

        let splits = ClassificationService::validate_rows(transaction, total, &rows).unwrap();

        prop_assert_eq!(splits.len(), cents.len());
        let sum: Decimal = splits.iter().map(|s| s.amount).sum();
        prop_assert_eq!(sum, total);
        for (split, c) in splits.iter().zip(&cents) {
            prop_assert_eq!(split.amount, Decimal::new(*c, 2));
        }
    }

    /// Any non-zero difference between split sum and total is a mismatch.
    #[test]
    fn prop_perturbed_total_rejected(
        cents in split_cents(),
        delta in prop_oneof![-100_000i64..0i64, 1i64..100_000i64],
    ) {
        let transaction = Uuid::new_v4();
        let sum: i64 = cents.iter().sum();
        let expected = Decimal::new(sum + delta, 2);
        let rows = rows_for(transaction, &cents, false);

        let err = ClassificationService::validate_rows(transaction, expected, &rows).unwrap_err();

        let is_mismatch = matches!(
            err,
            ClassificationError::SplitSumMismatch { total, expected: e }
                if total == Decimal::new(sum, 2) && e == expected
        );
        prop_assert!(is_mismatch);
    }

    /// Oversized amounts fail validation instead of overflowing the sum.
    #[test]
    fn prop_oversized_amounts_rejected(
        amounts in wide_amounts(),
        expected_cents in 1i64..1_000_000i64,
    ) {
        let transaction = Uuid::new_v4();
        let expected = Decimal::new(expected_cents, 2);
        let body = amounts
            .iter()
            .map(|a| json!({
                "transaction": transaction.to_string(),
                "cost_centre": Uuid::new_v4().to_string(),
                "entity": Uuid::new_v4().to_string(),
                "transaction_type": Uuid::new_v4().to_string(),
                "amount": a.to_string(),
                "value_date": "2025-06-30",
            }))
            .collect();
        let rows = ClassificationService::decode_rows(Value::Array(body)).unwrap();

        let result = ClassificationService::validate_rows(transaction, expected, &rows);

        if amounts.iter().any(|a| !fits_precision(*a)) {
            prop_assert!(result.is_err());
        }
        if let Ok(splits) = result {
            prop_assert!(splits.iter().all(|s| fits_precision(s.amount)));
        }
    }
}

//! Classification service for split validation.
//!
//! Validation is pure: callers supply the parent transaction amount and a
//! lookup closure for referenced rows, and persist the result themselves.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use igen_shared::FieldError;
use igen_shared::types::amount::{fits_precision, fits_scale, parse_amount};
use rust_decimal::Decimal;
use serde_json::Value;
use uuid::Uuid;

use super::error::ClassificationError;
use super::types::{ReferenceKind, SplitRowInput, ValidatedSplit};

const REQUIRED: &str = "This field is required.";
const INVALID_NUMBER: &str = "A valid number is required.";
const INVALID_UUID: &str = "Must be a valid UUID.";
const INVALID_DATE: &str = "Date has wrong format. Use YYYY-MM-DD.";
const INVALID_TEXT: &str = "Not a valid string.";
const NOT_POSITIVE: &str = "Ensure this value is greater than 0.";
const TOO_MANY_PLACES: &str = "Ensure that there are no more than 2 decimal places.";
const TOO_MANY_DIGITS: &str = "Ensure that there are no more than 12 digits in total.";
const WRONG_TRANSACTION: &str = "Does not match the transaction being classified.";

/// Classification service.
///
/// Contains pure business logic with no database dependencies.
pub struct ClassificationService;

impl ClassificationService {
    /// Decodes a request body into split rows.
    ///
    /// # Errors
    ///
    /// Returns `MalformedBatch` when the body is not a list, `EmptyBatch` when
    /// it is empty, and `InvalidRows` for list items that are not objects.
    pub fn decode_rows(body: Value) -> Result<Vec<SplitRowInput>, ClassificationError> {
        let Value::Array(items) = body else {
            return Err(ClassificationError::MalformedBatch);
        };
        if items.is_empty() {
            return Err(ClassificationError::EmptyBatch);
        }

        let mut rows = Vec::with_capacity(items.len());
        let mut errors = Vec::new();
        for (index, item) in items.into_iter().enumerate() {
            match serde_json::from_value::<SplitRowInput>(item) {
                Ok(row) => rows.push(row),
                Err(_) => errors.push(FieldError::at_row(
                    index,
                    "non_field_errors",
                    "Invalid data. Expected an object.",
                )),
            }
        }

        if errors.is_empty() {
            Ok(rows)
        } else {
            Err(ClassificationError::InvalidRows(errors))
        }
    }

    /// Returns the transaction named by the first row.
    ///
    /// # Errors
    ///
    /// Returns `EmptyBatch` for no rows, or `InvalidRows` on row 0 when its
    /// `transaction` field is missing or malformed.
    pub fn target_transaction(rows: &[SplitRowInput]) -> Result<Uuid, ClassificationError> {
        let first = rows.first().ok_or(ClassificationError::EmptyBatch)?;
        match uuid_field(first.transaction.as_ref()) {
            Ok(Some(id)) => Ok(id),
            Ok(None) => Err(ClassificationError::InvalidRows(vec![FieldError::at_row(
                0,
                "transaction",
                REQUIRED,
            )])),
            Err(message) => Err(ClassificationError::InvalidRows(vec![FieldError::at_row(
                0,
                "transaction",
                message,
            )])),
        }
    }

    /// Validates split rows against the parent transaction.
    ///
    /// Steps, in order:
    /// 1. Parse every amount, failing fast on the first bad one
    /// 2. Sum the amounts
    /// 3. Compare the sum with `expected` using exact decimal equality
    /// 4. Validate every row's schema, collecting all errors
    ///
    /// Referenced rows are checked separately by [`Self::check_references`].
    ///
    /// # Errors
    ///
    /// Returns the first failing step's `ClassificationError`.
    pub fn validate_rows(
        transaction_id: Uuid,
        expected: Decimal,
        rows: &[SplitRowInput],
    ) -> Result<Vec<ValidatedSplit>, ClassificationError> {
        if rows.is_empty() {
            return Err(ClassificationError::EmptyBatch);
        }

        // 1. Parse amounts
        let amounts = rows
            .iter()
            .enumerate()
            .map(|(row, input)| {
                amount_field(input.amount.as_ref()).map_err(|message| {
                    ClassificationError::InvalidAmount {
                        row,
                        message: message.to_string(),
                    }
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        // 2-3. Sum and compare
        let total = checked_total(&amounts)?;
        if total != expected {
            return Err(ClassificationError::SplitSumMismatch { total, expected });
        }

        // 4. Schema
        let mut errors = Vec::new();
        let mut splits = Vec::with_capacity(rows.len());
        for (row, (input, amount)) in rows.iter().zip(amounts).enumerate() {
            if let Some(split) = Self::validate_row(row, transaction_id, input, amount, &mut errors)
            {
                splits.push(split);
            }
        }

        if errors.is_empty() {
            Ok(splits)
        } else {
            Err(ClassificationError::InvalidRows(errors))
        }
    }

    /// Checks that every referenced row exists.
    ///
    /// # Errors
    ///
    /// Returns `ReferenceNotFound` for the first missing reference, in row
    /// order and then field order.
    pub fn check_references<R>(
        splits: &[ValidatedSplit],
        exists: R,
    ) -> Result<(), ClassificationError>
    where
        R: Fn(ReferenceKind, Uuid) -> bool,
    {
        for (row, split) in splits.iter().enumerate() {
            if let Some((kind, id)) = split.references().find(|(kind, id)| !exists(*kind, *id)) {
                return Err(ClassificationError::ReferenceNotFound { row, kind, id });
            }
        }
        Ok(())
    }

    /// Groups the ids referenced by `splits` by kind, for batched lookups.
    #[must_use]
    pub fn referenced_ids(splits: &[ValidatedSplit]) -> BTreeMap<ReferenceKind, BTreeSet<Uuid>> {
        let mut ids: BTreeMap<ReferenceKind, BTreeSet<Uuid>> = BTreeMap::new();
        for (kind, id) in splits.iter().flat_map(ValidatedSplit::references) {
            ids.entry(kind).or_default().insert(id);
        }
        ids
    }

    fn validate_row(
        row: usize,
        transaction_id: Uuid,
        input: &SplitRowInput,
        amount: Decimal,
        errors: &mut Vec<FieldError>,
    ) -> Option<ValidatedSplit> {
        let before = errors.len();
        let mut fail = |field: &str, message: &str| {
            errors.push(FieldError::at_row(row, field, message));
        };

        match uuid_field(input.transaction.as_ref()) {
            Ok(Some(id)) if id == transaction_id => {}
            Ok(Some(_)) => fail("transaction", WRONG_TRANSACTION),
            Ok(None) => fail("transaction", REQUIRED),
            Err(message) => fail("transaction", message),
        }

        let mut required = |field: &str, value: Option<&Value>| match uuid_field(value) {
            Ok(Some(id)) => Some(id),
            Ok(None) => {
                fail(field, REQUIRED);
                None
            }
            Err(message) => {
                fail(field, message);
                None
            }
        };
        let cost_centre = required("cost_centre", input.cost_centre.as_ref());
        let entity = required("entity", input.entity.as_ref());
        let transaction_type = required("transaction_type", input.transaction_type.as_ref());

        let mut optional = |field: &str, value: Option<&Value>| {
            uuid_field(value).unwrap_or_else(|message| {
                fail(field, message);
                None
            })
        };
        let asset = optional("asset", input.asset.as_ref());
        let contract = optional("contract", input.contract.as_ref());

        if amount <= Decimal::ZERO {
            fail("amount", NOT_POSITIVE);
        } else if !fits_scale(amount) {
            fail("amount", TOO_MANY_PLACES);
        } else if !fits_precision(amount) {
            fail("amount", TOO_MANY_DIGITS);
        }

        let value_date = match input.value_date.as_ref() {
            None | Some(Value::Null) => {
                fail("value_date", REQUIRED);
                None
            }
            Some(Value::String(raw)) => NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
                .map_err(|_| fail("value_date", INVALID_DATE))
                .ok(),
            Some(_) => {
                fail("value_date", INVALID_DATE);
                None
            }
        };

        let remarks = match input.remarks.as_ref() {
            None | Some(Value::Null) => None,
            Some(Value::String(text)) if text.trim().is_empty() => None,
            Some(Value::String(text)) => Some(text.clone()),
            Some(_) => {
                fail("remarks", INVALID_TEXT);
                None
            }
        };

        if errors.len() > before {
            return None;
        }

        Some(ValidatedSplit {
            cost_centre: cost_centre?,
            entity: entity?,
            transaction_type: transaction_type?,
            asset,
            contract,
            amount: amount.round_dp(2),
            value_date: value_date?,
            remarks,
        })
    }
}

/// Sums split amounts, naming the row whose amount overflows the total.
fn checked_total(amounts: &[Decimal]) -> Result<Decimal, ClassificationError> {
    amounts
        .iter()
        .enumerate()
        .try_fold(Decimal::ZERO, |acc, (row, amount)| {
            acc.checked_add(*amount)
                .ok_or_else(|| ClassificationError::InvalidAmount {
                    row,
                    message: TOO_MANY_DIGITS.to_string(),
                })
        })
}

/// Reads an optional UUID field. Blank strings count as absent.
fn uuid_field(value: Option<&Value>) -> Result<Option<Uuid>, &'static str> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(raw)) if raw.trim().is_empty() => Ok(None),
        Some(Value::String(raw)) => Uuid::parse_str(raw.trim())
            .map(Some)
            .map_err(|_| INVALID_UUID),
        Some(_) => Err(INVALID_UUID),
    }
}

/// Reads an amount given as a JSON number or a numeric string.
fn amount_field(value: Option<&Value>) -> Result<Decimal, &'static str> {
    match value {
        None | Some(Value::Null) => Err(REQUIRED),
        Some(Value::Number(number)) => parse_amount(&number.to_string()).ok_or(INVALID_NUMBER),
        Some(Value::String(raw)) => parse_amount(raw).ok_or(INVALID_NUMBER),
        Some(_) => Err(INVALID_NUMBER),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    struct Fixture {
        transaction: Uuid,
        cost_centre: Uuid,
        entity: Uuid,
        transaction_type: Uuid,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                transaction: Uuid::new_v4(),
                cost_centre: Uuid::new_v4(),
                entity: Uuid::new_v4(),
                transaction_type: Uuid::new_v4(),
            }
        }

        fn row(&self, amount: Value) -> Value {
            json!({
                "transaction": self.transaction.to_string(),
                "cost_centre": self.cost_centre.to_string(),
                "entity": self.entity.to_string(),
                "transaction_type": self.transaction_type.to_string(),
                "amount": amount,
                "value_date": "2025-04-01",
                "remarks": "rent"
            })
        }

        fn rows(&self, amounts: &[Value]) -> Vec<SplitRowInput> {
            let body = Value::Array(amounts.iter().cloned().map(|a| self.row(a)).collect());
            ClassificationService::decode_rows(body).unwrap()
        }
    }

    fn details(err: ClassificationError) -> Vec<FieldError> {
        match err {
            ClassificationError::InvalidRows(details) => details,
            other => panic!("expected InvalidRows, got {other:?}"),
        }
    }

    #[test]
    fn test_valid_split_600_400() {
        let f = Fixture::new();
        let rows = f.rows(&[json!("600.00"), json!(400)]);

        let splits =
            ClassificationService::validate_rows(f.transaction, dec!(1000.00), &rows).unwrap();

        assert_eq!(splits.len(), 2);
        assert_eq!(splits[0].amount, dec!(600.00));
        assert_eq!(splits[1].amount, dec!(400));
        assert_eq!(splits[0].cost_centre, f.cost_centre);
        assert_eq!(splits[0].remarks.as_deref(), Some("rent"));
        assert_eq!(
            splits[0].value_date,
            NaiveDate::from_ymd_opt(2025, 4, 1).unwrap()
        );
    }

    #[test]
    fn test_sum_mismatch_reports_both_amounts() {
        let f = Fixture::new();
        let rows = f.rows(&[json!("600.00"), json!("399.99")]);

        let err =
            ClassificationService::validate_rows(f.transaction, dec!(1000.00), &rows).unwrap_err();

        let message = err.to_string();
        assert!(message.contains("999.99"), "{message}");
        assert!(message.contains("1000.00"), "{message}");
    }

    #[test]
    fn test_first_bad_amount_fails_fast() {
        let f = Fixture::new();
        let rows = f.rows(&[json!("100"), json!("abc"), json!("xyz")]);

        let err =
            ClassificationService::validate_rows(f.transaction, dec!(100), &rows).unwrap_err();

        assert!(matches!(
            err,
            ClassificationError::InvalidAmount { row: 1, ref message } if message == INVALID_NUMBER
        ));
    }

    #[test]
    fn test_overflowing_amounts_rejected_without_panic() {
        let f = Fixture::new();
        let max = Decimal::MAX.to_string();
        let rows = f.rows(&[json!(max), json!(max)]);

        let err =
            ClassificationService::validate_rows(f.transaction, dec!(100), &rows).unwrap_err();

        assert!(matches!(
            err,
            ClassificationError::InvalidAmount { row: 1, ref message } if message == TOO_MANY_DIGITS
        ));
        let app: igen_shared::AppError = err.into();
        assert_eq!(app.status_code(), 400);
    }

    #[test]
    fn test_oversized_amount_that_sums_is_a_schema_error() {
        let f = Fixture::new();
        let rows = f.rows(&[json!("10000000000.00"), json!("-9999999990.00")]);

        let errors = details(
            ClassificationService::validate_rows(f.transaction, dec!(10), &rows).unwrap_err(),
        );
        assert_eq!(
            errors,
            vec![
                FieldError::at_row(0, "amount", TOO_MANY_DIGITS),
                FieldError::at_row(1, "amount", NOT_POSITIVE),
            ]
        );
    }

    #[test]
    fn test_missing_amount_fails_fast() {
        let f = Fixture::new();
        let mut body = f.row(json!("1"));
        body.as_object_mut().unwrap().remove("amount");
        let rows = ClassificationService::decode_rows(json!([body])).unwrap();

        let err = ClassificationService::validate_rows(f.transaction, dec!(1), &rows).unwrap_err();
        assert!(matches!(err, ClassificationError::InvalidAmount { row: 0, .. }));
    }

    #[test]
    fn test_sum_checked_before_schema() {
        let f = Fixture::new();
        let mut body = f.row(json!("10"));
        body["cost_centre"] = json!("not-a-uuid");
        let rows = ClassificationService::decode_rows(json!([body])).unwrap();

        let err = ClassificationService::validate_rows(f.transaction, dec!(20), &rows).unwrap_err();
        assert!(matches!(err, ClassificationError::SplitSumMismatch { .. }));
    }

    #[test]
    fn test_schema_errors_are_collected_per_row() {
        let f = Fixture::new();
        let mut first = f.row(json!("5"));
        first["cost_centre"] = json!("not-a-uuid");
        first["value_date"] = json!("01/04/2025");
        let mut second = f.row(json!("5"));
        second.as_object_mut().unwrap().remove("entity");
        let rows = ClassificationService::decode_rows(json!([first, second])).unwrap();

        let errors = details(
            ClassificationService::validate_rows(f.transaction, dec!(10), &rows).unwrap_err(),
        );

        assert_eq!(
            errors,
            vec![
                FieldError::at_row(0, "cost_centre", INVALID_UUID),
                FieldError::at_row(0, "value_date", INVALID_DATE),
                FieldError::at_row(1, "entity", REQUIRED),
            ]
        );
    }

    #[test]
    fn test_embedded_transaction_must_match() {
        let f = Fixture::new();
        let mut body = f.row(json!("10"));
        body["transaction"] = json!(Uuid::new_v4().to_string());
        let rows = ClassificationService::decode_rows(json!([body])).unwrap();

        let errors = details(
            ClassificationService::validate_rows(f.transaction, dec!(10), &rows).unwrap_err(),
        );
        assert_eq!(
            errors,
            vec![FieldError::at_row(0, "transaction", WRONG_TRANSACTION)]
        );
    }

    #[test]
    fn test_non_positive_and_over_precise_amounts_rejected() {
        let f = Fixture::new();
        let rows = f.rows(&[json!("-5.00"), json!("15.001"), json!("0")]);

        let errors = details(
            ClassificationService::validate_rows(f.transaction, dec!(10.001), &rows).unwrap_err(),
        );
        assert_eq!(
            errors,
            vec![
                FieldError::at_row(0, "amount", NOT_POSITIVE),
                FieldError::at_row(1, "amount", TOO_MANY_PLACES),
                FieldError::at_row(2, "amount", NOT_POSITIVE),
            ]
        );
    }

    #[test]
    fn test_optional_references_validated_when_present() {
        let f = Fixture::new();
        let asset = Uuid::new_v4();
        let mut first = f.row(json!("4"));
        first["asset"] = json!(asset.to_string());
        first["contract"] = json!("");
        let mut second = f.row(json!("6"));
        second["contract"] = json!(42);
        let rows = ClassificationService::decode_rows(json!([first, second])).unwrap();

        let errors = details(
            ClassificationService::validate_rows(f.transaction, dec!(10), &rows).unwrap_err(),
        );
        assert_eq!(errors, vec![FieldError::at_row(1, "contract", INVALID_UUID)]);

        let rows = ClassificationService::decode_rows(json!([f.row(json!("10"))])).unwrap();
        let splits = ClassificationService::validate_rows(f.transaction, dec!(10), &rows).unwrap();
        assert_eq!(splits[0].asset, None);
        assert_eq!(splits[0].contract, None);
    }

    #[test]
    fn test_decode_rejects_empty_and_non_list() {
        assert!(matches!(
            ClassificationService::decode_rows(json!([])),
            Err(ClassificationError::EmptyBatch)
        ));
        assert!(matches!(
            ClassificationService::decode_rows(json!({"amount": 1})),
            Err(ClassificationError::MalformedBatch)
        ));
        let errors = details(ClassificationService::decode_rows(json!([{}, 7])).unwrap_err());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].row, Some(1));
    }

    #[test]
    fn test_target_transaction_from_first_row() {
        let f = Fixture::new();
        let rows = f.rows(&[json!("1")]);
        assert_eq!(
            ClassificationService::target_transaction(&rows).unwrap(),
            f.transaction
        );

        let rows = ClassificationService::decode_rows(json!([{"amount": "1"}])).unwrap();
        let errors = details(ClassificationService::target_transaction(&rows).unwrap_err());
        assert_eq!(errors, vec![FieldError::at_row(0, "transaction", REQUIRED)]);
    }

    #[test]
    fn test_check_references_reports_first_missing() {
        let f = Fixture::new();
        let rows = f.rows(&[json!("3"), json!("7")]);
        let splits = ClassificationService::validate_rows(f.transaction, dec!(10), &rows).unwrap();

        assert!(ClassificationService::check_references(&splits, |_, _| true).is_ok());

        let err = ClassificationService::check_references(&splits, |kind, _| {
            kind != ReferenceKind::Entity
        })
        .unwrap_err();
        assert!(matches!(
            err,
            ClassificationError::ReferenceNotFound { row: 0, kind: ReferenceKind::Entity, id } if id == f.entity
        ));
    }

    #[test]
    fn test_referenced_ids_deduplicated_by_kind() {
        let f = Fixture::new();
        let rows = f.rows(&[json!("3"), json!("7")]);
        let splits = ClassificationService::validate_rows(f.transaction, dec!(10), &rows).unwrap();

        let ids = ClassificationService::referenced_ids(&splits);
        assert_eq!(ids.len(), 3);
        assert_eq!(ids[&ReferenceKind::CostCentre].len(), 1);
        assert!(!ids.contains_key(&ReferenceKind::Asset));
    }
}

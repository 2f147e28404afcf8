//! Classification domain types.

use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// One split row as submitted by the client.
///
/// Fields are kept as raw JSON so that every malformed field can be reported
/// individually instead of failing the whole row at deserialization.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SplitRowInput {
    /// Parent transaction id.
    pub transaction: Option<Value>,
    /// Cost centre id.
    pub cost_centre: Option<Value>,
    /// Entity id.
    pub entity: Option<Value>,
    /// Transaction type id.
    pub transaction_type: Option<Value>,
    /// Optional asset id.
    pub asset: Option<Value>,
    /// Optional contract id.
    pub contract: Option<Value>,
    /// Split amount, JSON number or numeric string.
    pub amount: Option<Value>,
    /// Value date, `YYYY-MM-DD`.
    pub value_date: Option<Value>,
    /// Free-text remarks.
    pub remarks: Option<Value>,
}

/// A split row that passed schema validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedSplit {
    /// Cost centre id.
    pub cost_centre: Uuid,
    /// Entity id.
    pub entity: Uuid,
    /// Transaction type id.
    pub transaction_type: Uuid,
    /// Optional asset id.
    pub asset: Option<Uuid>,
    /// Optional contract id.
    pub contract: Option<Uuid>,
    /// Strictly positive amount with at most two decimal places.
    pub amount: Decimal,
    /// Value date.
    pub value_date: NaiveDate,
    /// Free-text remarks.
    pub remarks: Option<String>,
}

impl ValidatedSplit {
    /// Returns every id this row references, with its kind.
    pub fn references(&self) -> impl Iterator<Item = (ReferenceKind, Uuid)> + '_ {
        [
            Some((ReferenceKind::CostCentre, self.cost_centre)),
            Some((ReferenceKind::Entity, self.entity)),
            Some((ReferenceKind::TransactionType, self.transaction_type)),
            self.asset.map(|id| (ReferenceKind::Asset, id)),
            self.contract.map(|id| (ReferenceKind::Contract, id)),
        ]
        .into_iter()
        .flatten()
    }
}

/// Kinds of rows a split may reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ReferenceKind {
    /// Cost centre.
    CostCentre,
    /// Counterparty entity.
    Entity,
    /// Transaction type.
    TransactionType,
    /// Asset.
    Asset,
    /// Contract.
    Contract,
}

impl ReferenceKind {
    /// Returns the split-row field holding this reference.
    #[must_use]
    pub const fn field(self) -> &'static str {
        match self {
            Self::CostCentre => "cost_centre",
            Self::Entity => "entity",
            Self::TransactionType => "transaction_type",
            Self::Asset => "asset",
            Self::Contract => "contract",
        }
    }

    /// Returns the display name of the referenced resource.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CostCentre => "CostCentre",
            Self::Entity => "Entity",
            Self::TransactionType => "TransactionType",
            Self::Asset => "Asset",
            Self::Contract => "Contract",
        }
    }
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Derived classification status of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClassificationStatus {
    /// No split rows exist.
    Unclassified,
    /// At least one split row exists.
    Classified,
}

impl ClassificationStatus {
    /// Maps a split-row count to a status.
    #[must_use]
    pub const fn from_count(count: u64) -> Self {
        if count == 0 {
            Self::Unclassified
        } else {
            Self::Classified
        }
    }

    /// Returns true when the transaction has been classified.
    #[must_use]
    pub const fn is_classified(self) -> bool {
        matches!(self, Self::Classified)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_from_count() {
        assert_eq!(
            ClassificationStatus::from_count(0),
            ClassificationStatus::Unclassified
        );
        assert_eq!(
            ClassificationStatus::from_count(3),
            ClassificationStatus::Classified
        );
        assert!(ClassificationStatus::from_count(1).is_classified());
        assert_eq!(
            serde_json::to_value(ClassificationStatus::Unclassified).unwrap(),
            "UNCLASSIFIED"
        );
    }

    #[test]
    fn test_references_skip_missing_optionals() {
        let split = ValidatedSplit {
            cost_centre: Uuid::new_v4(),
            entity: Uuid::new_v4(),
            transaction_type: Uuid::new_v4(),
            asset: None,
            contract: Some(Uuid::new_v4()),
            amount: Decimal::ONE,
            value_date: NaiveDate::from_ymd_opt(2025, 1, 31).unwrap(),
            remarks: None,
        };
        let kinds: Vec<_> = split.references().map(|(kind, _)| kind).collect();
        assert_eq!(
            kinds,
            vec![
                ReferenceKind::CostCentre,
                ReferenceKind::Entity,
                ReferenceKind::TransactionType,
                ReferenceKind::Contract,
            ]
        );
    }

    #[test]
    fn test_row_input_accepts_partial_objects() {
        let row: SplitRowInput = serde_json::from_str(r#"{"amount": "10.00"}"#).unwrap();
        assert!(row.cost_centre.is_none());
        assert_eq!(row.amount, Some(Value::String("10.00".into())));
    }
}

//! Transaction domain types.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use igen_shared::FieldError;
use igen_shared::types::CompanyId;
use igen_shared::types::amount::{fits_precision, fits_scale, parse_amount};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Money movement direction on the bank account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    /// Money in.
    Credit,
    /// Money out.
    Debit,
}

impl Direction {
    /// Returns the stored name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Credit => "CREDIT",
            Self::Debit => "DEBIT",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "CREDIT" => Ok(Self::Credit),
            "DEBIT" => Ok(Self::Debit),
            _ => Err(format!("\"{}\" is not a valid choice.", s.trim())),
        }
    }
}

/// Company-owned rows a transaction points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OwnedReference {
    /// Bank account the money moved through.
    BankAccount,
    /// Cost centre.
    CostCentre,
    /// Transaction type.
    TransactionType,
}

impl OwnedReference {
    /// Returns the input field holding this reference.
    #[must_use]
    pub const fn field(self) -> &'static str {
        match self {
            Self::BankAccount => "bank_account",
            Self::CostCentre => "cost_centre",
            Self::TransactionType => "transaction_type",
        }
    }

    /// Returns the display name of the referenced resource.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BankAccount => "BankAccount",
            Self::CostCentre => "CostCentre",
            Self::TransactionType => "TransactionType",
        }
    }
}

/// Raw, unvalidated transaction fields from JSON or a CSV row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionDraft {
    /// Company id.
    pub company: String,
    /// Bank account id.
    pub bank_account: String,
    /// Cost centre id.
    pub cost_centre: String,
    /// Transaction type id.
    pub transaction_type: String,
    /// `CREDIT` or `DEBIT`.
    pub direction: String,
    /// Decimal amount.
    pub amount: String,
    /// Booking date, `YYYY-MM-DD`.
    pub date: String,
    /// Free-text notes.
    pub notes: String,
}

/// A validated transaction ready to insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTransaction {
    /// Owning company.
    pub company: CompanyId,
    /// Bank account id.
    pub bank_account: Uuid,
    /// Cost centre id.
    pub cost_centre: Uuid,
    /// Transaction type id.
    pub transaction_type: Uuid,
    /// Direction.
    pub direction: Direction,
    /// Strictly positive amount, two decimal places.
    pub amount: Decimal,
    /// Booking date.
    pub date: NaiveDate,
    /// Notes, `None` when blank.
    pub notes: Option<String>,
}

impl TransactionDraft {
    /// Builds a draft from a JSON object. Numbers are accepted for `amount`.
    ///
    /// Non-object bodies produce an empty draft, which then fails validation
    /// on every required field.
    #[must_use]
    pub fn from_json(body: &Value) -> Self {
        let text = |field: &str| match body.get(field) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => String::new(),
        };
        Self {
            company: text("company"),
            bank_account: text("bank_account"),
            cost_centre: text("cost_centre"),
            transaction_type: text("transaction_type"),
            direction: text("direction"),
            amount: text("amount"),
            date: text("date"),
            notes: text("notes"),
        }
    }

    /// Validates every field, collecting all errors.
    ///
    /// `row` tags the errors with a batch position when set.
    pub fn validate(&self, row: Option<usize>) -> Result<NewTransaction, Vec<FieldError>> {
        let mut errors = Vec::new();
        let mut fail = |field: &str, message: String| {
            errors.push(FieldError {
                row,
                field: field.to_string(),
                message,
            });
        };

        let mut uuid = |field: &str, raw: &str| {
            let raw = raw.trim();
            if raw.is_empty() {
                fail(field, "This field is required.".to_string());
                return None;
            }
            Uuid::parse_str(raw)
                .map_err(|_| fail(field, "Must be a valid UUID.".to_string()))
                .ok()
        };
        let company = uuid("company", &self.company);
        let bank_account = uuid("bank_account", &self.bank_account);
        let cost_centre = uuid("cost_centre", &self.cost_centre);
        let transaction_type = uuid("transaction_type", &self.transaction_type);

        let direction = if self.direction.trim().is_empty() {
            fail("direction", "This field is required.".to_string());
            None
        } else {
            self.direction
                .parse::<Direction>()
                .map_err(|message| fail("direction", message))
                .ok()
        };

        let amount = match parse_amount(&self.amount) {
            None if self.amount.trim().is_empty() => {
                fail("amount", "This field is required.".to_string());
                None
            }
            None => {
                fail("amount", "A valid number is required.".to_string());
                None
            }
            Some(value) if value <= Decimal::ZERO => {
                fail("amount", "Ensure this value is greater than 0.".to_string());
                None
            }
            Some(value) if !fits_scale(value) => {
                fail(
                    "amount",
                    "Ensure that there are no more than 2 decimal places.".to_string(),
                );
                None
            }
            Some(value) if !fits_precision(value) => {
                fail(
                    "amount",
                    "Ensure that there are no more than 12 digits in total.".to_string(),
                );
                None
            }
            Some(value) => Some(value.round_dp(2)),
        };

        let date = if self.date.trim().is_empty() {
            fail("date", "This field is required.".to_string());
            None
        } else {
            NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d")
                .map_err(|_| fail("date", "Date has wrong format. Use YYYY-MM-DD.".to_string()))
                .ok()
        };

        let notes = Some(self.notes.trim())
            .filter(|n| !n.is_empty())
            .map(ToString::to_string);

        match (
            company,
            bank_account,
            cost_centre,
            transaction_type,
            direction,
            amount,
            date,
        ) {
            (
                Some(company),
                Some(bank_account),
                Some(cost_centre),
                Some(transaction_type),
                Some(direction),
                Some(amount),
                Some(date),
            ) if errors.is_empty() => Ok(NewTransaction {
                company: CompanyId::from_uuid(company),
                bank_account,
                cost_centre,
                transaction_type,
                direction,
                amount,
                date,
                notes,
            }),
            _ => Err(errors),
        }
    }
}

impl NewTransaction {
    /// Returns the company-owned rows this transaction points at.
    #[must_use]
    pub const fn references(&self) -> [(OwnedReference, Uuid); 3] {
        [
            (OwnedReference::BankAccount, self.bank_account),
            (OwnedReference::CostCentre, self.cost_centre),
            (OwnedReference::TransactionType, self.transaction_type),
        ]
    }

    /// Returns the references that are missing or owned by another company.
    ///
    /// `owner_of` yields the owning company of a referenced row, `None` if it
    /// does not exist.
    pub fn foreign_references<F>(&self, owner_of: F) -> Vec<(OwnedReference, Uuid)>
    where
        F: Fn(OwnedReference, Uuid) -> Option<CompanyId>,
    {
        self.references()
            .into_iter()
            .filter(|(kind, id)| owner_of(*kind, *id) != Some(self.company))
            .collect()
    }
}

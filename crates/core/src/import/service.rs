//! CSV parsing and row validation for bulk import.

use csv::{ReaderBuilder, StringRecord, Trim};
use igen_shared::FieldError;
use igen_shared::types::CompanyId;

use super::error::ImportError;
use crate::transaction::{NewTransaction, OwnedReference, TransactionDraft};

/// Columns every import file must carry. `notes` is optional.
pub const REQUIRED_COLUMNS: [&str; 7] = [
    "company",
    "bank_account",
    "cost_centre",
    "transaction_type",
    "direction",
    "amount",
    "date",
];

/// A validated CSV row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRow {
    /// 1-based data-row position (the header is not counted).
    pub row: usize,
    /// Validated transaction.
    pub transaction: NewTransaction,
}

/// Bulk import service.
pub struct ImportService;

/// Column positions resolved from the header.
struct Columns {
    fields: [usize; 7],
    notes: Option<usize>,
}

impl Columns {
    fn resolve(headers: &StringRecord) -> Result<Self, ImportError> {
        let position = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };

        let missing: Vec<&str> = REQUIRED_COLUMNS
            .iter()
            .copied()
            .filter(|name| position(name).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(ImportError::Unreadable(format!(
                "missing column(s): {}",
                missing.join(", ")
            )));
        }

        let mut fields = [0; 7];
        for (slot, name) in fields.iter_mut().zip(REQUIRED_COLUMNS) {
            *slot = position(name).unwrap_or_default();
        }
        Ok(Self {
            fields,
            notes: position("notes"),
        })
    }

    fn draft(&self, record: &StringRecord) -> TransactionDraft {
        let get = |idx: usize| record.get(idx).unwrap_or_default().to_string();
        let [company, bank_account, cost_centre, transaction_type, direction, amount, date] =
            self.fields.map(get);
        TransactionDraft {
            company,
            bank_account,
            cost_centre,
            transaction_type,
            direction,
            amount,
            date,
            notes: self.notes.map(get).unwrap_or_default(),
        }
    }
}

impl ImportService {
    /// Parses and validates an uploaded CSV file.
    ///
    /// # Errors
    ///
    /// Returns `Unreadable` for a missing header or column, `Empty` when the
    /// file has no data rows, and `InvalidRows` carrying every row's errors
    /// keyed by 1-based row position.
    pub fn parse(bytes: &[u8]) -> Result<Vec<ImportRow>, ImportError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(bytes);

        let headers = reader
            .headers()
            .map_err(|e| ImportError::Unreadable(e.to_string()))?
            .clone();
        let columns = Columns::resolve(&headers)?;

        let mut rows = Vec::new();
        let mut errors = Vec::new();
        let mut seen = 0;

        for (index, record) in reader.records().enumerate() {
            let row = index + 1;
            seen = row;
            match record {
                Ok(record) => match columns.draft(&record).validate(Some(row)) {
                    Ok(transaction) => rows.push(ImportRow { row, transaction }),
                    Err(row_errors) => errors.extend(row_errors),
                },
                Err(e) => errors.push(FieldError::at_row(row, "non_field_errors", e.to_string())),
            }
        }

        if seen == 0 {
            return Err(ImportError::Empty);
        }
        if !errors.is_empty() {
            return Err(ImportError::InvalidRows(errors));
        }
        Ok(rows)
    }

    /// Checks each row's company scope and references.
    ///
    /// `in_scope` tells whether the caller may create rows for a company;
    /// `owner_of` yields the owning company of a referenced row.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRows` with every failing row.
    pub fn check_rows<S, O>(rows: &[ImportRow], in_scope: S, owner_of: O) -> Result<(), ImportError>
    where
        S: Fn(CompanyId) -> bool,
        O: Fn(OwnedReference, uuid::Uuid) -> Option<CompanyId>,
    {
        let mut errors = Vec::new();
        for ImportRow { row, transaction } in rows {
            if !in_scope(transaction.company) {
                errors.push(FieldError::at_row(
                    *row,
                    "company",
                    format!("Company not found: {}", transaction.company),
                ));
                continue;
            }
            for (kind, id) in transaction.foreign_references(&owner_of) {
                errors.push(FieldError::at_row(
                    *row,
                    kind.field(),
                    format!("{} not found for this company: {id}", kind.as_str()),
                ));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ImportError::InvalidRows(errors))
        }
    }
}

// ✅ Validation - entry form checks and boundary checks for loaded records
//
// Records reach the aggregator only after passing through here, so the
// aggregator can assume known categories, allowed methods and amounts >= 0.

use crate::catalog::Catalog;
use crate::record::{new_id, Kind, PaymentMethod, TransactionRecord};
use anyhow::{bail, Result};
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

// ============================================================================
// VALIDATION ERROR
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        ValidationError {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Warning the user must confirm before the record is saved
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ValidationWarning {
    HighAmount { amount: Decimal, threshold: Decimal },
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationWarning::HighAmount { amount, threshold } => write!(
                f,
                "amount {} is above the alert threshold of {}; confirm before saving",
                amount, threshold
            ),
        }
    }
}

// ============================================================================
// DRAFTS
// ============================================================================

/// RecordDraft - raw entry form input
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordDraft {
    pub kind: Option<Kind>,
    pub category: String,
    pub payment_method: Option<PaymentMethod>,
    /// As typed; parsed during validation
    pub amount: String,
    pub notes: String,
}

/// A draft that passed validation, with any warnings still to confirm
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedDraft {
    pub kind: Kind,
    pub category: String,
    pub payment_method: PaymentMethod,
    pub amount: Decimal,
    pub notes: Option<String>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidatedDraft {
    pub fn needs_confirmation(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Turn into a record stamped at `timestamp` with a fresh id
    pub fn into_record(self, timestamp: NaiveDateTime) -> TransactionRecord {
        TransactionRecord {
            id: new_id(),
            amount: self.amount,
            timestamp,
            category: self.category,
            payment_method: self.payment_method,
            kind: self.kind,
            notes: self.notes,
        }
    }
}

pub struct DraftValidator<'a> {
    catalog: &'a Catalog,
}

impl<'a> DraftValidator<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        DraftValidator { catalog }
    }

    /// Validate a draft, collecting every problem rather than stopping at the first
    pub fn validate(&self, draft: &RecordDraft) -> Result<ValidatedDraft, Vec<ValidationError>> {
        let mut errors = Vec::new();

        let kind = draft.kind;
        if kind.is_none() {
            errors.push(ValidationError::new("kind", "Select income or expense"));
        }

        let category_input = draft.category.trim();
        let mut category = None;
        if category_input.is_empty() {
            errors.push(ValidationError::new("category", "Select a category"));
        } else if let Some(kind) = kind {
            match self.catalog.find_category(kind, category_input) {
                Some(name) => category = Some(name.to_string()),
                None => errors.push(ValidationError::new(
                    "category",
                    format!("'{}' is not a known {} category", category_input, kind),
                )),
            }
        }

        match (draft.payment_method, kind, &category) {
            (None, _, _) => {
                errors.push(ValidationError::new("payment_method", "Select a payment method"));
            }
            (Some(method), Some(kind), Some(category)) => {
                if !self.catalog.is_allowed_method(kind, category, method) {
                    errors.push(ValidationError::new(
                        "payment_method",
                        format!("{} is not accepted for {}", method.name(), category),
                    ));
                }
            }
            _ => {}
        }

        let amount = match Decimal::from_str(draft.amount.trim()) {
            Ok(amount) if amount > Decimal::ZERO => Some(amount),
            _ => {
                errors.push(ValidationError::new("amount", "Enter an amount greater than zero"));
                None
            }
        };

        if !errors.is_empty() {
            return Err(errors);
        }

        match (kind, category, draft.payment_method, amount) {
            (Some(kind), Some(category), Some(payment_method), Some(amount)) => {
                let mut warnings = Vec::new();
                if self.catalog.is_high_amount(kind, amount) {
                    warnings.push(ValidationWarning::HighAmount {
                        amount,
                        threshold: self.catalog.alert_threshold(kind),
                    });
                }

                let notes = Some(draft.notes.trim().to_string()).filter(|n| !n.is_empty());

                Ok(ValidatedDraft {
                    kind,
                    category,
                    payment_method,
                    amount,
                    notes,
                    warnings,
                })
            }
            _ => Err(vec![ValidationError::new("draft", "Incomplete entry")]),
        }
    }
}

// ============================================================================
// LOADED RECORD CHECKS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Error,   // Record would violate the aggregator's input contract
    Warning, // Record is valid but worth a second look
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordIssue {
    pub record_id: String,
    pub severity: Severity,
    pub message: String,
}

/// Run the entry-time checks over records that are already stored
pub fn check_records(catalog: &Catalog, records: &[TransactionRecord]) -> Vec<RecordIssue> {
    let mut issues = Vec::new();

    for record in records {
        let mut push = |severity: Severity, message: String| {
            issues.push(RecordIssue {
                record_id: record.id.clone(),
                severity,
                message,
            })
        };

        if record.amount < Decimal::ZERO {
            push(Severity::Error, format!("Negative amount {}", record.amount));
        }

        if !catalog.is_allowed_category(record.kind, &record.category) {
            push(
                Severity::Error,
                format!("Unknown {} category '{}'", record.kind, record.category),
            );
        } else if !catalog.is_allowed_method(record.kind, &record.category, record.payment_method) {
            push(
                Severity::Error,
                format!(
                    "{} is not accepted for {}",
                    record.payment_method.name(),
                    record.category
                ),
            );
        }

        if catalog.is_high_amount(record.kind, record.amount) {
            push(
                Severity::Warning,
                format!(
                    "Amount {} is above the {} alert threshold",
                    record.amount, record.kind
                ),
            );
        }
    }

    issues
}

// ============================================================================
// CASH COUNT
// ============================================================================

/// Bill denominations the register counts
pub const DENOMINATIONS: [u32; 10] = [10, 20, 50, 100, 200, 500, 1000, 2000, 10000, 20000];

/// CashCount - bills counted per denomination for cash entries
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CashCount {
    counts: BTreeMap<u32, u32>,
}

impl CashCount {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set how many bills of `denomination` were counted
    pub fn set(&mut self, denomination: u32, count: u32) -> Result<()> {
        if !DENOMINATIONS.contains(&denomination) {
            bail!("Unknown denomination: {}", denomination);
        }
        if count == 0 {
            self.counts.remove(&denomination);
        } else {
            self.counts.insert(denomination, count);
        }
        Ok(())
    }

    pub fn count(&self, denomination: u32) -> u32 {
        self.counts.get(&denomination).copied().unwrap_or(0)
    }

    pub fn total(&self) -> Decimal {
        self.counts
            .iter()
            .map(|(denomination, count)| Decimal::from(*denomination) * Decimal::from(*count))
            .sum()
    }

    pub fn clear(&mut self) {
        self.counts.clear();
    }
}

// ============================================================================
// TESTS
// ============================================================================

// 📊 Aggregator - period, category, payment-method and window summaries
//
// Every function here is a pure single pass over the records it is given:
// no wall clock, no logging, no mutation of the input.

use crate::record::{Kind, PaymentMethod, TransactionRecord};
use chrono::{Datelike, Duration, NaiveDate};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

// ============================================================================
// PERIOD KEY
// ============================================================================

/// PeriodKey - calendar year + month, rendered as "YYYY-MM"
///
/// Field order makes the derived ordering chronological.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PeriodKey {
    pub year: i32,
    pub month: u32,
}

impl PeriodKey {
    pub fn of(date: NaiveDate) -> Self {
        PeriodKey {
            year: date.year(),
            month: date.month(),
        }
    }
}

impl fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl Serialize for PeriodKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// ============================================================================
// SUMMARY TYPES
// ============================================================================

/// Totals for one calendar month, broken out by payment method
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodBucket {
    pub period: PeriodKey,
    pub total: Decimal,
    pub by_method: BTreeMap<PaymentMethod, Decimal>,
}

impl PeriodBucket {
    fn new(period: PeriodKey) -> Self {
        PeriodBucket {
            period,
            total: Decimal::ZERO,
            by_method: BTreeMap::new(),
        }
    }

    /// Subtotal for a method, zero when the method never appeared
    pub fn method_total(&self, method: PaymentMethod) -> Decimal {
        self.by_method.get(&method).copied().unwrap_or(Decimal::ZERO)
    }
}

/// Share of a category within all records of the same kind
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryShare {
    pub category: String,
    pub kind: Kind,
    pub total: Decimal,
    /// 0.0 - 100.0; zero when the kind total is zero
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MethodTotal {
    pub method: PaymentMethod,
    pub total: Decimal,
}

/// Rolling totals relative to a reference day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct WindowTotals {
    pub today: Decimal,
    pub last_7_days: Decimal,
    pub month_to_date: Decimal,
}

// ============================================================================
// RECORD FILTER
// ============================================================================

/// RecordFilter - ready-made predicate for window totals
///
/// Unset fields match everything. Dashboard variants such as
/// "card + transfer income today" are a kind plus a method list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordFilter {
    pub kind: Option<Kind>,
    pub methods: Option<Vec<PaymentMethod>>,
    pub category: Option<String>,
}

impl RecordFilter {
    /// Matches every record
    pub fn all() -> Self {
        Self::default()
    }

    pub fn kind(kind: Kind) -> Self {
        RecordFilter {
            kind: Some(kind),
            ..Self::default()
        }
    }

    /// Builder pattern: restrict to a set of payment methods
    pub fn with_methods(mut self, methods: &[PaymentMethod]) -> Self {
        self.methods = Some(methods.to_vec());
        self
    }

    /// Builder pattern: restrict to one category
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn matches(&self, record: &TransactionRecord) -> bool {
        if let Some(kind) = self.kind {
            if record.kind != kind {
                return false;
            }
        }
        if let Some(methods) = &self.methods {
            if !methods.contains(&record.payment_method) {
                return false;
            }
        }
        if let Some(category) = &self.category {
            if &record.category != category {
                return false;
            }
        }
        true
    }
}

// ============================================================================
// OPERATIONS
// ============================================================================

/// Monthly income totals with per-method subtotals, oldest month first
///
/// Expense records are not part of this view; see `summarize_by_period_for`.
pub fn summarize_by_period(records: &[TransactionRecord]) -> Vec<PeriodBucket> {
    summarize_by_period_for(records, Kind::Income)
}

/// Monthly totals for one kind, oldest month first
pub fn summarize_by_period_for(records: &[TransactionRecord], kind: Kind) -> Vec<PeriodBucket> {
    let mut buckets: BTreeMap<PeriodKey, PeriodBucket> = BTreeMap::new();

    for record in records.iter().filter(|r| r.kind == kind) {
        let key = PeriodKey::of(record.date());
        let bucket = buckets.entry(key).or_insert_with(|| PeriodBucket::new(key));
        bucket.total += record.amount;
        *bucket
            .by_method
            .entry(record.payment_method)
            .or_insert(Decimal::ZERO) += record.amount;
    }

    buckets.into_values().collect()
}

/// Totals and percentage share per (category, kind)
///
/// Percentages are relative to the total of the same kind. Output is ordered
/// by kind then category name; callers should not rely on it.
pub fn summarize_by_category(records: &[TransactionRecord]) -> Vec<CategoryShare> {
    let mut groups: BTreeMap<(Kind, &str), Decimal> = BTreeMap::new();
    let mut kind_totals: BTreeMap<Kind, Decimal> = BTreeMap::new();

    for record in records {
        *groups
            .entry((record.kind, record.category.as_str()))
            .or_insert(Decimal::ZERO) += record.amount;
        *kind_totals.entry(record.kind).or_insert(Decimal::ZERO) += record.amount;
    }

    groups
        .into_iter()
        .map(|((kind, category), total)| {
            let kind_total = kind_totals.get(&kind).copied().unwrap_or(Decimal::ZERO);
            CategoryShare {
                category: category.to_string(),
                kind,
                total,
                percentage: percentage_of(total, kind_total),
            }
        })
        .collect()
}

/// Totals per payment method over every given record, regardless of kind
pub fn summarize_by_payment_method(records: &[TransactionRecord]) -> Vec<MethodTotal> {
    let mut totals: BTreeMap<PaymentMethod, Decimal> = BTreeMap::new();

    for record in records {
        *totals.entry(record.payment_method).or_insert(Decimal::ZERO) += record.amount;
    }

    totals
        .into_iter()
        .map(|(method, total)| MethodTotal { method, total })
        .collect()
}

/// Today / last 7 days / month-to-date totals ending at `reference_date`
pub fn summarize_window_totals(
    records: &[TransactionRecord],
    reference_date: NaiveDate,
) -> WindowTotals {
    summarize_window_totals_matching(records, reference_date, |_| true)
}

/// Window totals over the records accepted by `predicate`
///
/// All three windows end at `reference_date` inclusive; the 7-day window
/// starts six days earlier, month-to-date starts on the 1st.
pub fn summarize_window_totals_matching<F>(
    records: &[TransactionRecord],
    reference_date: NaiveDate,
    predicate: F,
) -> WindowTotals
where
    F: Fn(&TransactionRecord) -> bool,
{
    let week_start = reference_date
        .checked_sub_signed(Duration::days(6))
        .unwrap_or(NaiveDate::MIN);
    let month_start = reference_date.with_day(1).unwrap_or(reference_date);

    let mut totals = WindowTotals::default();

    for record in records.iter().filter(|&r| predicate(r)) {
        let date = record.date();
        if date > reference_date {
            continue;
        }
        if date == reference_date {
            totals.today += record.amount;
        }
        if date >= week_start {
            totals.last_7_days += record.amount;
        }
        if date >= month_start {
            totals.month_to_date += record.amount;
        }
    }

    totals
}

/// Sum of amounts, zero for no records
pub fn total_amount<'a, I>(records: I) -> Decimal
where
    I: IntoIterator<Item = &'a TransactionRecord>,
{
    records.into_iter().map(|r| r.amount).sum()
}

fn percentage_of(part: Decimal, whole: Decimal) -> f64 {
    if whole.is_zero() {
        return 0.0;
    }
    (part * Decimal::ONE_HUNDRED / whole).to_f64().unwrap_or(0.0)
}

// ============================================================================
// TESTS
// ============================================================================

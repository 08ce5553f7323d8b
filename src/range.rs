// 📅 Date Range - the dashboard's [from, to] selection
// Inclusive on both ends; `to` covers the whole day up to 23:59:59

use crate::record::TransactionRecord;
use anyhow::{bail, Result};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Days shown by default when no range is chosen
pub const DEFAULT_LOOKBACK_DAYS: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Result<Self> {
        if from > to {
            bail!("Range start {} is after range end {}", from, to);
        }
        Ok(DateRange { from, to })
    }

    /// `days` before `reference` through `reference`; clamps at the calendar's first day
    pub fn last_days(reference: NaiveDate, days: i64) -> Self {
        let from = Duration::try_days(days.max(0))
            .and_then(|span| reference.checked_sub_signed(span))
            .unwrap_or(NaiveDate::MIN);
        DateRange { from, to: reference }
    }

    pub fn contains_date(&self, date: NaiveDate) -> bool {
        self.from <= date && date <= self.to
    }

    pub fn contains(&self, record: &TransactionRecord) -> bool {
        self.contains_date(record.date())
    }

    /// Records inside the range, most recent first
    pub fn filter<'a>(&self, records: &'a [TransactionRecord]) -> Vec<&'a TransactionRecord> {
        let mut selected: Vec<&TransactionRecord> =
            records.iter().filter(|r| self.contains(r)).collect();
        selected.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        selected
    }

    /// Owned copy of `filter`, for callers that aggregate the selection
    pub fn select(&self, records: &[TransactionRecord]) -> Vec<TransactionRecord> {
        self.filter(records).into_iter().cloned().collect()
    }
}

// 📤 Spreadsheet Export - filtered records to CSV
// Exports the records themselves, not the aggregates

use crate::record::TransactionRecord;
use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use serde::Serialize;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

const DATE_FORMAT: &str = "%d/%m/%Y %H:%M";

/// One spreadsheet row, column names as shown to the user
#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    #[serde(rename = "Category")]
    category: &'a str,

    #[serde(rename = "Kind")]
    kind: &'static str,

    #[serde(rename = "Amount")]
    amount: String,

    #[serde(rename = "Payment Method")]
    payment_method: &'static str,

    #[serde(rename = "Date")]
    date: String,

    #[serde(rename = "Notes")]
    notes: &'a str,
}

impl<'a> From<&'a TransactionRecord> for ExportRow<'a> {
    fn from(record: &'a TransactionRecord) -> Self {
        ExportRow {
            category: &record.category,
            kind: record.kind.name(),
            amount: format!("{:.2}", record.amount),
            payment_method: record.payment_method.name(),
            date: record.timestamp.format(DATE_FORMAT).to_string(),
            notes: record.notes.as_deref().unwrap_or(""),
        }
    }
}

/// Write records as CSV with a header row; returns the number of data rows
pub fn export_csv<'a, I, W>(records: I, writer: W) -> Result<usize>
where
    I: IntoIterator<Item = &'a TransactionRecord>,
    W: Write,
{
    let records: Vec<&TransactionRecord> = records.into_iter().collect();
    if records.is_empty() {
        bail!("No records to export");
    }

    let mut wtr = csv::Writer::from_writer(writer);
    for record in &records {
        wtr.serialize(ExportRow::from(*record))
            .with_context(|| format!("Failed to write record {}", record.id))?;
    }
    wtr.flush().context("Failed to flush export")?;

    Ok(records.len())
}

/// File name for an export taken on `date`, e.g. `ingresos_2024-03-10.csv`
pub fn export_file_name(label: &str, date: NaiveDate) -> String {
    format!("{}_{}.csv", label, date.format("%Y-%m-%d"))
}

/// Write the export into `dir`, creating it if needed
pub fn export_file<'a, I>(records: I, dir: &Path, label: &str, date: NaiveDate) -> Result<PathBuf>
where
    I: IntoIterator<Item = &'a TransactionRecord>,
{
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create export directory: {}", dir.display()))?;

    let path = dir.join(export_file_name(label, date));
    let file = File::create(&path)
        .with_context(|| format!("Failed to create export file: {}", path.display()))?;

    let rows = export_csv(records, file)?;
    tracing::info!(path = %path.display(), rows, "exported records");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{Kind, PaymentMethod};
    use rust_decimal_macros::dec;

    fn sample() -> Vec<TransactionRecord> {
        let ts = NaiveDate::from_ymd_opt(2024, 3, 10)
            .unwrap()
            .and_hms_opt(14, 30, 0)
            .unwrap();
        vec![
            TransactionRecord::new(Kind::Income, "REPARTO", PaymentMethod::Cash, dec!(1500.5), ts)
                .with_notes("apertura"),
            TransactionRecord::new(Kind::Expense, "TAXI/UBER", PaymentMethod::ECheck, dec!(20), ts),
        ]
    }

    #[test]
    fn test_export_csv_layout() {
        let records = sample();
        let mut out = Vec::new();

        let rows = export_csv(&records, &mut out).unwrap();
        assert_eq!(rows, 2);

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Category,Kind,Amount,Payment Method,Date,Notes");
        assert_eq!(lines[1], "REPARTO,Income,1500.50,Cash,10/03/2024 14:30,apertura");
        assert_eq!(lines[2], "TAXI/UBER,Expense,20.00,eCheck,10/03/2024 14:30,");
    }

    #[test]
    fn test_export_empty_is_an_error() {
        let records: Vec<TransactionRecord> = Vec::new();
        let err = export_csv(&records, Vec::new()).unwrap_err();
        assert!(err.to_string().contains("No records"));
    }

    #[test]
    fn test_export_file() {
        let dir = tempfile::tempdir().unwrap();
        let records = sample();
        let date = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();

        let path = export_file(
            records.iter().filter(|r| r.is_income()),
            &dir.path().join("exports"),
            Kind::Income.export_label(),
            date,
        )
        .unwrap();

        assert_eq!(path.file_name().unwrap(), "ingresos_2024-03-10.csv");
        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(text.contains("REPARTO"));
        assert!(!text.contains("TAXI/UBER"));
    }
}

// 📒 Record Model - cash register income and expense entries
// One immutable record per movement, loaded from the store's CSV export

use anyhow::{anyhow, bail, Context, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use csv::{ReaderBuilder, Trim};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

// ============================================================================
// KIND
// ============================================================================

/// Kind - which side of the register a movement lands on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    /// Money received into a register or account
    Income,

    /// Money paid out
    Expense,
}

impl Kind {
    pub const ALL: [Kind; 2] = [Kind::Income, Kind::Expense];

    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Income => "income",
            Kind::Expense => "expense",
        }
    }

    /// Label shown to the user, matching `PaymentMethod::name`
    pub fn name(&self) -> &'static str {
        match self {
            Kind::Income => "Income",
            Kind::Expense => "Expense",
        }
    }

    /// Prefix used for exported spreadsheet file names
    pub fn export_label(&self) -> &'static str {
        match self {
            Kind::Income => "ingresos",
            Kind::Expense => "gastos",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Kind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "income" | "ingreso" | "ingresos" => Ok(Kind::Income),
            "expense" | "gasto" | "gastos" | "egreso" => Ok(Kind::Expense),
            other => Err(anyhow!("Unknown movement kind: '{}'", other)),
        }
    }
}

// ============================================================================
// PAYMENT METHOD
// ============================================================================

/// PaymentMethod - closed set of channels funds can move through
///
/// Declaration order is the order subtotals are reported in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Cash,
    Card,
    Transfer,
    Deposit,
    Check,
    #[serde(rename = "echeck")]
    ECheck,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 6] = [
        PaymentMethod::Cash,
        PaymentMethod::Card,
        PaymentMethod::Transfer,
        PaymentMethod::Deposit,
        PaymentMethod::Check,
        PaymentMethod::ECheck,
    ];

    /// Short code for internal use and CSV files
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Card => "card",
            PaymentMethod::Transfer => "transfer",
            PaymentMethod::Deposit => "deposit",
            PaymentMethod::Check => "check",
            PaymentMethod::ECheck => "echeck",
        }
    }

    /// Human-readable name for display
    pub fn name(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "Cash",
            PaymentMethod::Card => "Card",
            PaymentMethod::Transfer => "Transfer",
            PaymentMethod::Deposit => "Deposit",
            PaymentMethod::Check => "Check",
            PaymentMethod::ECheck => "eCheck",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "cash" | "efectivo" | "contado" => Ok(PaymentMethod::Cash),
            "card" | "tarjeta" => Ok(PaymentMethod::Card),
            "transfer" | "transferencia" => Ok(PaymentMethod::Transfer),
            "deposit" | "depósito" | "deposito" => Ok(PaymentMethod::Deposit),
            "check" | "cheque" => Ok(PaymentMethod::Check),
            "echeck" | "echeq" | "e-check" => Ok(PaymentMethod::ECheck),
            other => Err(anyhow!("Unknown payment method: '{}'", other)),
        }
    }
}

// ============================================================================
// TRANSACTION RECORD
// ============================================================================

/// TransactionRecord - a single income or expense entry
///
/// `amount` is never negative; the direction lives in `kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Stable identity assigned by the store
    pub id: String,

    pub amount: Decimal,

    /// Business time of the movement (register wall clock)
    pub timestamp: NaiveDateTime,

    /// Register name for income, expense category for expenses
    pub category: String,

    pub payment_method: PaymentMethod,

    pub kind: Kind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl TransactionRecord {
    /// Create a record with a freshly generated id
    pub fn new(
        kind: Kind,
        category: impl Into<String>,
        payment_method: PaymentMethod,
        amount: Decimal,
        timestamp: NaiveDateTime,
    ) -> Self {
        TransactionRecord {
            id: new_id(),
            amount,
            timestamp,
            category: category.into(),
            payment_method,
            kind,
            notes: None,
        }
    }

    /// Builder pattern: keep the id the store assigned
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Builder pattern: add free-text notes
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Calendar day of the movement
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }

    pub fn is_income(&self) -> bool {
        self.kind == Kind::Income
    }

    pub fn is_expense(&self) -> bool {
        self.kind == Kind::Expense
    }
}

/// New opaque record identity
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Parse a timestamp as the store writes it
///
/// Accepts RFC 3339 (offset dropped, wall clock kept), naive ISO date-times
/// with `T` or space, and plain dates (midnight).
pub fn parse_timestamp(value: &str) -> Result<NaiveDateTime> {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.naive_local());
    }

    const FORMATS: [&str; 5] = [
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
    ];
    for format in FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(dt);
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return date
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| anyhow!("Invalid midnight for date: {}", value));
    }

    bail!("Unrecognized timestamp: '{}'", value)
}

/// Sort in place, most recent movement first
pub fn sort_newest_first(records: &mut [TransactionRecord]) {
    records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
}

// ============================================================================
// CSV LOADING
// ============================================================================

/// Row as exported by the store; labels are parsed after deserialization
#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(default)]
    id: Option<String>,
    kind: String,
    category: String,
    payment_method: String,
    amount: String,
    timestamp: String,
    #[serde(default)]
    notes: Option<String>,
}

impl CsvRow {
    fn into_record(self) -> Result<TransactionRecord> {
        let kind: Kind = self.kind.parse()?;
        let payment_method: PaymentMethod = self.payment_method.parse()?;

        let amount = Decimal::from_str(self.amount.trim())
            .with_context(|| format!("Invalid amount: '{}'", self.amount))?;
        if amount < Decimal::ZERO {
            bail!("Amount must not be negative, got {}", amount);
        }

        let category = self.category.trim().to_string();
        if category.is_empty() {
            bail!("Category is required");
        }

        let timestamp = parse_timestamp(&self.timestamp)?;

        let id = match self.id {
            Some(id) if !id.trim().is_empty() => id.trim().to_string(),
            _ => new_id(),
        };

        let notes = self
            .notes
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());

        Ok(TransactionRecord {
            id,
            amount,
            timestamp,
            category,
            payment_method,
            kind,
            notes,
        })
    }
}

/// Read records from any CSV source with a header row
///
/// Columns: `id,kind,category,payment_method,amount,timestamp,notes`
/// (`id` and `notes` may be empty).
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<TransactionRecord>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(reader);

    let mut records = Vec::new();

    for (index, result) in rdr.deserialize().enumerate() {
        // Header is line 1
        let line = index + 2;
        let row: CsvRow =
            result.with_context(|| format!("Failed to deserialize record at line {}", line))?;
        let record = row
            .into_record()
            .with_context(|| format!("Invalid record at line {}", line))?;
        records.push(record);
    }

    Ok(records)
}

/// Load records from a CSV file exported by the store
pub fn load_csv(csv_path: &Path) -> Result<Vec<TransactionRecord>> {
    let file = File::open(csv_path)
        .with_context(|| format!("Failed to open CSV file: {}", csv_path.display()))?;

    let records = read_csv(file)?;
    tracing::debug!(path = %csv_path.display(), count = records.len(), "loaded records");

    Ok(records)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;
    use rust_decimal_macros::dec;

    #[test]
    fn test_kind_labels() {
        assert_eq!("income".parse::<Kind>().unwrap(), Kind::Income);
        assert_eq!("Ingreso".parse::<Kind>().unwrap(), Kind::Income);
        assert_eq!("gasto".parse::<Kind>().unwrap(), Kind::Expense);
        assert_eq!(" EXPENSE ".parse::<Kind>().unwrap(), Kind::Expense);
        assert!("transfer".parse::<Kind>().is_err());
        assert_eq!(Kind::Income.name(), "Income");
        assert_eq!(Kind::Expense.export_label(), "gastos");
    }

    #[test]
    fn test_payment_method_aliases() {
        assert_eq!("Efectivo".parse::<PaymentMethod>().unwrap(), PaymentMethod::Cash);
        assert_eq!("contado".parse::<PaymentMethod>().unwrap(), PaymentMethod::Cash);
        assert_eq!("tarjeta".parse::<PaymentMethod>().unwrap(), PaymentMethod::Card);
        assert_eq!("Transferencia".parse::<PaymentMethod>().unwrap(), PaymentMethod::Transfer);
        assert_eq!("Depósito".parse::<PaymentMethod>().unwrap(), PaymentMethod::Deposit);
        assert_eq!("Cheque".parse::<PaymentMethod>().unwrap(), PaymentMethod::Check);
        assert_eq!("eCheq".parse::<PaymentMethod>().unwrap(), PaymentMethod::ECheck);

        let err = "bitcoin".parse::<PaymentMethod>().unwrap_err();
        assert!(err.to_string().contains("bitcoin"));
    }

    #[test]
    fn test_payment_method_round_trips_through_code() {
        for method in PaymentMethod::ALL {
            assert_eq!(method.as_str().parse::<PaymentMethod>().unwrap(), method);
        }
    }

    #[test]
    fn test_parse_timestamp_forms() {
        let rfc = parse_timestamp("2024-03-10T14:30:00-03:00").unwrap();
        assert_eq!(rfc.date(), NaiveDate::from_ymd_opt(2024, 3, 10).unwrap());
        assert_eq!(rfc.hour(), 14);

        let naive = parse_timestamp("2024-03-10T09:15:00").unwrap();
        assert_eq!(naive.hour(), 9);

        let spaced = parse_timestamp("2024-03-10 23:59:59.500").unwrap();
        assert_eq!(spaced.second(), 59);

        let date_only = parse_timestamp("2024-03-10").unwrap();
        assert_eq!(date_only.hour(), 0);
        assert_eq!(date_only.date(), NaiveDate::from_ymd_opt(2024, 3, 10).unwrap());

        assert!(parse_timestamp("10/03/2024").is_err());
        assert!(parse_timestamp("").is_err());
    }

    #[test]
    fn test_read_csv_parses_rows() {
        let data = "\
id,kind,category,payment_method,amount,timestamp,notes
abc-1,ingreso,CAJA COLON TM,Efectivo,1500.50,2024-03-10T10:00:00,apertura
,gasto,LIMPIEZA,Transferencia,200,2024-03-09,
";
        let records = read_csv(data.as_bytes()).unwrap();
        assert_eq!(records.len(), 2);

        let first = &records[0];
        assert_eq!(first.id, "abc-1");
        assert_eq!(first.kind, Kind::Income);
        assert_eq!(first.category, "CAJA COLON TM");
        assert_eq!(first.payment_method, PaymentMethod::Cash);
        assert_eq!(first.amount, dec!(1500.50));
        assert_eq!(first.notes.as_deref(), Some("apertura"));

        let second = &records[1];
        assert!(!second.id.is_empty());
        assert_eq!(second.kind, Kind::Expense);
        assert_eq!(second.amount, dec!(200));
        assert!(second.notes.is_none());
    }

    #[test]
    fn test_read_csv_rejects_negative_amount() {
        let data = "\
id,kind,category,payment_method,amount,timestamp,notes
x,income,REPARTO,cash,-5,2024-03-10,
";
        let err = read_csv(data.as_bytes()).unwrap_err();
        assert!(format!("{:#}", err).contains("line 2"));
        assert!(format!("{:#}", err).contains("negative"));
    }

    #[test]
    fn test_read_csv_rejects_empty_category() {
        let data = "\
id,kind,category,payment_method,amount,timestamp,notes
x,income,,cash,5,2024-03-10,
";
        assert!(read_csv(data.as_bytes()).is_err());
    }

    #[test]
    fn test_load_csv_missing_file() {
        let err = load_csv(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(err.to_string().contains("Failed to open CSV file"));
    }

    #[test]
    fn test_sort_newest_first() {
        let day = |d: u32| {
            NaiveDate::from_ymd_opt(2024, 1, d)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap()
        };
        let mut records = vec![
            TransactionRecord::new(Kind::Income, "A", PaymentMethod::Cash, dec!(1), day(1)),
            TransactionRecord::new(Kind::Income, "A", PaymentMethod::Cash, dec!(2), day(3)),
            TransactionRecord::new(Kind::Income, "A", PaymentMethod::Cash, dec!(3), day(2)),
        ];

        sort_newest_first(&mut records);

        let amounts: Vec<Decimal> = records.iter().map(|r| r.amount).collect();
        assert_eq!(amounts, vec![dec!(2), dec!(3), dec!(1)]);
    }

    #[test]
    fn test_record_builders() {
        let ts = parse_timestamp("2024-01-01").unwrap();
        let record = TransactionRecord::new(Kind::Expense, "SUPER", PaymentMethod::Card, dec!(10), ts)
            .with_id("fixed")
            .with_notes("weekly shop");

        assert_eq!(record.id, "fixed");
        assert_eq!(record.notes.as_deref(), Some("weekly shop"));
        assert!(record.is_expense());
        assert!(!record.is_income());
    }
}

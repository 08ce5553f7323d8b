use anyhow::{anyhow, bail, Context, Result};
use chrono::{Local, NaiveDate};
use std::collections::BTreeSet;
use std::env;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use cashbook::{
    check_records, dashboard_stats, export_file, load_csv, summarize_by_category,
    summarize_by_payment_method, summarize_by_period, DateRange, Kind, PaymentMethod, Settings,
    Severity, TransactionRecord,
};

const USAGE: &str = "\
Usage:
  cashbook summary <records.csv> [--from YYYY-MM-DD] [--to YYYY-MM-DD] [--today YYYY-MM-DD]
  cashbook export  <records.csv> <out-dir> [--kind income|expense] [--from ..] [--to ..] [--today ..]
  cashbook check   <records.csv>";

fn main() -> Result<()> {
    let settings = Settings::load()?;
    init_tracing(&settings);
    tracing::debug!(
        catalog = ?settings.catalog_path,
        lookback_days = settings.lookback_days,
        "loaded settings"
    );

    let args: Vec<String> = env::args().skip(1).collect();
    let rest = args.get(1..).unwrap_or(&[]);

    match args.first().map(String::as_str) {
        Some("summary") => run_summary(&settings, rest),
        Some("export") => run_export(&settings, rest),
        Some("check") => run_check(&settings, rest),
        _ => {
            eprintln!("{}", USAGE);
            std::process::exit(2);
        }
    }
}

/// Logs go to stderr so reports on stdout stay clean
fn init_tracing(settings: &Settings) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.log_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

// ============================================================================
// OPTIONS
// ============================================================================

#[derive(Debug, Default)]
struct Options {
    positional: Vec<String>,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    today: Option<NaiveDate>,
    kind: Option<Kind>,
}

impl Options {
    fn parse(args: &[String]) -> Result<Self> {
        let mut options = Options::default();
        let mut iter = args.iter();

        while let Some(arg) = iter.next() {
            let mut value = |flag: &str| {
                iter.next()
                    .cloned()
                    .ok_or_else(|| anyhow!("Missing value for {}", flag))
            };
            match arg.as_str() {
                "--from" => options.from = Some(parse_date(&value("--from")?)?),
                "--to" => options.to = Some(parse_date(&value("--to")?)?),
                "--today" => options.today = Some(parse_date(&value("--today")?)?),
                "--kind" => options.kind = Some(value("--kind")?.parse()?),
                flag if flag.starts_with("--") => bail!("Unknown option: {}", flag),
                _ => options.positional.push(arg.clone()),
            }
        }

        Ok(options)
    }

    fn input(&self) -> Result<&Path> {
        self.positional
            .first()
            .map(Path::new)
            .ok_or_else(|| anyhow!("Missing records CSV path\n\n{}", USAGE))
    }

    /// The only place the wall clock is read
    fn reference_date(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Local::now().date_naive())
    }

    fn range(&self, settings: &Settings) -> Result<DateRange> {
        let to = self.to.unwrap_or_else(|| self.reference_date());
        match self.from {
            Some(from) => DateRange::new(from, to),
            None => Ok(DateRange::last_days(to, settings.lookback_days)),
        }
    }
}

fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", value))
}

// ============================================================================
// COMMANDS
// ============================================================================

fn run_summary(settings: &Settings, args: &[String]) -> Result<()> {
    let options = Options::parse(args)?;
    let records = load_csv(options.input()?)?;
    let range = options.range(settings)?;
    let reference = options.reference_date();
    let selected = range.select(&records);

    tracing::info!(
        loaded = records.len(),
        selected = selected.len(),
        from = %range.from,
        to = %range.to,
        "building summary"
    );

    print_dashboard(&selected, reference, &range);
    print_periods(&selected);
    print_categories(&selected);
    print_methods(&selected);

    Ok(())
}

fn run_export(settings: &Settings, args: &[String]) -> Result<()> {
    let options = Options::parse(args)?;
    let input = options.input()?;
    let out_dir: PathBuf = options
        .positional
        .get(1)
        .map(PathBuf::from)
        .ok_or_else(|| anyhow!("Missing output directory\n\n{}", USAGE))?;
    let kind = options.kind.unwrap_or(Kind::Income);

    let records = load_csv(input)?;
    let range = options.range(settings)?;
    let selected = range
        .filter(&records)
        .into_iter()
        .filter(|r| r.kind == kind);

    let path = export_file(selected, &out_dir, kind.export_label(), options.reference_date())?;
    println!("✓ Exported {} records to {}", kind, path.display());

    Ok(())
}

fn run_check(settings: &Settings, args: &[String]) -> Result<()> {
    let options = Options::parse(args)?;
    let catalog = settings.catalog()?;
    let records = load_csv(options.input()?)?;

    let issues = check_records(&catalog, &records);
    let errors = issues.iter().filter(|i| i.severity == Severity::Error).count();

    for issue in &issues {
        let marker = match issue.severity {
            Severity::Error => "❌",
            Severity::Warning => "⚠️ ",
        };
        println!("{} {}  {}", marker, issue.record_id, issue.message);
    }
    println!(
        "\n{} records checked, {} errors, {} warnings",
        records.len(),
        errors,
        issues.len() - errors
    );

    if errors > 0 {
        std::process::exit(1);
    }
    Ok(())
}

// ============================================================================
// REPORT PRINTING
// ============================================================================

fn print_dashboard(records: &[TransactionRecord], reference: NaiveDate, range: &DateRange) {
    let stats = dashboard_stats(records, reference);

    println!("📊 Dashboard  (day {}, range {} to {})", reference, range.from, range.to);
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("  Income today             {:>16.2}", stats.income_today);
    println!("  Expenses today           {:>16.2}", stats.expenses_today);
    println!("  Cash on hand today       {:>16.2}", stats.cash_today);
    println!("  Card + transfer today    {:>16.2}", stats.card_and_transfer_today);
    println!("  Net today                {:>16.2}", stats.net_today);
    println!("  Income month to date     {:>16.2}", stats.income_month);
    println!("  Income last 7 days       {:>16.2}", stats.income_last_7_days);
    println!("  Expenses month to date   {:>16.2}", stats.expenses_month);
    println!(
        "  Average income ({:>4})    {:>16.2}",
        stats.income_count, stats.average_income
    );
}

fn print_periods(records: &[TransactionRecord]) {
    let buckets = summarize_by_period(records);

    println!("\n📅 Monthly income");
    if buckets.is_empty() {
        println!("  (no income in range)");
        return;
    }

    let methods: BTreeSet<PaymentMethod> = buckets
        .iter()
        .flat_map(|b| b.by_method.keys().copied())
        .collect();

    let mut header = format!("  {:<8} {:>14}", "Month", "Total");
    for method in &methods {
        header.push_str(&format!(" {:>14}", method.name()));
    }
    println!("{}", header);

    for bucket in &buckets {
        let mut line = format!("  {:<8} {:>14.2}", bucket.period.to_string(), bucket.total);
        for method in &methods {
            line.push_str(&format!(" {:>14.2}", bucket.method_total(*method)));
        }
        println!("{}", line);
    }
}

fn print_categories(records: &[TransactionRecord]) {
    let mut shares = summarize_by_category(records);
    shares.sort_by(|a, b| a.kind.cmp(&b.kind).then(b.total.cmp(&a.total)));

    for kind in Kind::ALL {
        let of_kind: Vec<_> = shares.iter().filter(|s| s.kind == kind).collect();
        if of_kind.is_empty() {
            continue;
        }
        println!("\n🏷️  {} by category", kind);
        for share in of_kind {
            println!(
                "  {:<32} {:>14.2} {:>6.1}%",
                share.category, share.total, share.percentage
            );
        }
    }
}

fn print_methods(records: &[TransactionRecord]) {
    let income: Vec<TransactionRecord> = records.iter().filter(|r| r.is_income()).cloned().collect();
    let totals = summarize_by_payment_method(&income);
    if totals.is_empty() {
        return;
    }

    println!("\n💳 Income by payment method");
    for entry in totals {
        println!("  {:<12} {:>14.2}", entry.method.name(), entry.total);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn day(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    #[test]
    fn test_parse_flags_and_positionals() {
        let options = Options::parse(&args(&[
            "records.csv",
            "out",
            "--kind",
            "gasto",
            "--today",
            "2024-03-10",
        ]))
        .unwrap();

        assert_eq!(options.positional, vec!["records.csv", "out"]);
        assert_eq!(options.kind, Some(Kind::Expense));
        assert_eq!(options.reference_date(), day(3, 10));
        assert_eq!(options.input().unwrap(), Path::new("records.csv"));
    }

    #[test]
    fn test_parse_rejects_unknown_flag() {
        let err = Options::parse(&args(&["records.csv", "--verbose"])).unwrap_err();
        assert!(err.to_string().contains("Unknown option: --verbose"));
    }

    #[test]
    fn test_parse_rejects_missing_value() {
        let err = Options::parse(&args(&["records.csv", "--from"])).unwrap_err();
        assert!(err.to_string().contains("Missing value for --from"));
    }

    #[test]
    fn test_parse_rejects_bad_date() {
        assert!(Options::parse(&args(&["--today", "10/03/2024"])).is_err());
    }

    #[test]
    fn test_range_defaults_to_lookback_before_today() {
        let options = Options::parse(&args(&["records.csv", "--today", "2024-03-31"])).unwrap();
        let range = options.range(&Settings::default()).unwrap();

        assert_eq!(range.to, day(3, 31));
        assert_eq!(range.from, day(3, 1));
    }

    #[test]
    fn test_range_from_defaults_relative_to_explicit_to() {
        let options =
            Options::parse(&args(&["--today", "2024-03-31", "--to", "2024-03-15"])).unwrap();
        let settings = Settings {
            lookback_days: 7,
            ..Settings::default()
        };
        let range = options.range(&settings).unwrap();

        assert_eq!(range.to, day(3, 15));
        assert_eq!(range.from, day(3, 8));
    }

    #[test]
    fn test_range_explicit_bounds() {
        let options = Options::parse(&args(&[
            "--from",
            "2024-02-01",
            "--to",
            "2024-02-29",
            "--today",
            "2024-03-10",
        ]))
        .unwrap();
        let range = options.range(&Settings::default()).unwrap();

        assert_eq!(range, DateRange::new(day(2, 1), day(2, 29)).unwrap());
    }

    #[test]
    fn test_range_rejects_inverted_bounds() {
        let options = Options::parse(&args(&["--from", "2024-03-10", "--to", "2024-03-01"])).unwrap();
        assert!(options.range(&Settings::default()).is_err());
    }

    #[test]
    fn test_missing_input_path() {
        let options = Options::parse(&args(&["--today", "2024-03-10"])).unwrap();
        assert!(options.input().is_err());
    }
}

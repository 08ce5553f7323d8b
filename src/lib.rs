// Cashbook - Core Library
// Cash register bookkeeping: records, aggregation, validation and export

pub mod record;
pub mod aggregate;   // Pure period / category / method / window summaries
pub mod stats;       // Dashboard figures built on aggregate
pub mod range;
pub mod catalog;     // Allowed categories, methods, alert thresholds
pub mod validation;  // Entry form checks + boundary checks
pub mod export;
pub mod config;

// Re-export commonly used types
pub use record::{
    Kind, PaymentMethod, TransactionRecord,
    load_csv, read_csv, parse_timestamp, sort_newest_first, new_id,
};
pub use aggregate::{
    PeriodKey, PeriodBucket, CategoryShare, MethodTotal, WindowTotals, RecordFilter,
    summarize_by_period, summarize_by_period_for, summarize_by_category,
    summarize_by_payment_method, summarize_window_totals, summarize_window_totals_matching,
    total_amount,
};
pub use stats::{DashboardStats, dashboard_stats};
pub use range::{DateRange, DEFAULT_LOOKBACK_DAYS};
pub use catalog::Catalog;
pub use validation::{
    RecordDraft, ValidatedDraft, DraftValidator, ValidationError, ValidationWarning,
    RecordIssue, Severity, CashCount, DENOMINATIONS, check_records,
};
pub use export::{export_csv, export_file, export_file_name};
pub use config::Settings;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

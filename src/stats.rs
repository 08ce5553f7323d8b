// 📈 Dashboard Statistics - the figures behind the dashboard cards
// Composed entirely from window totals; same purity rules as the aggregator

use crate::aggregate::{summarize_window_totals_matching, total_amount, RecordFilter};
use crate::record::{Kind, PaymentMethod, TransactionRecord};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub reference_date: NaiveDate,
    pub income_today: Decimal,
    pub expenses_today: Decimal,
    /// Cash income minus cash expenses on the reference day
    pub cash_today: Decimal,
    pub card_and_transfer_today: Decimal,
    /// Income minus expenses on the reference day, every method
    pub net_today: Decimal,
    pub income_month: Decimal,
    pub income_last_7_days: Decimal,
    pub expenses_month: Decimal,
    pub income_count: usize,
    /// Mean income amount over the whole input
    pub average_income: Decimal,
}

/// Compute every dashboard figure relative to `reference_date`
pub fn dashboard_stats(records: &[TransactionRecord], reference_date: NaiveDate) -> DashboardStats {
    let totals_for = |filter: RecordFilter| {
        summarize_window_totals_matching(records, reference_date, |r| filter.matches(r))
    };

    let income = totals_for(RecordFilter::kind(Kind::Income));
    let expenses = totals_for(RecordFilter::kind(Kind::Expense));
    let cash_in = totals_for(RecordFilter::kind(Kind::Income).with_methods(&[PaymentMethod::Cash]));
    let cash_out =
        totals_for(RecordFilter::kind(Kind::Expense).with_methods(&[PaymentMethod::Cash]));
    let electronic = totals_for(
        RecordFilter::kind(Kind::Income).with_methods(&[PaymentMethod::Card, PaymentMethod::Transfer]),
    );

    let income_count = records.iter().filter(|r| r.is_income()).count();
    let income_sum = total_amount(records.iter().filter(|r| r.is_income()));
    let average_income = if income_count == 0 {
        Decimal::ZERO
    } else {
        income_sum / Decimal::from(income_count)
    };

    DashboardStats {
        reference_date,
        income_today: income.today,
        expenses_today: expenses.today,
        cash_today: cash_in.today - cash_out.today,
        card_and_transfer_today: electronic.today,
        net_today: income.today - expenses.today,
        income_month: income.month_to_date,
        income_last_7_days: income.last_7_days,
        expenses_month: expenses.month_to_date,
        income_count,
        average_income,
    }
}

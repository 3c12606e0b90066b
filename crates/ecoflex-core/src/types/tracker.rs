//! Monthly resilience tracker entries.

use chrono::{DateTime, Datelike, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One month of recorded household figures and the scores derived from them.
///
/// `month` is always the first day of its month; there is at most one entry
/// per account and month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResilienceEntry {
    /// Database identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// First day of the recorded month.
    pub month: NaiveDate,
    /// Income received during the month.
    pub total_income: f64,
    /// Spending during the month.
    pub total_expenses: f64,
    /// Savings at month end.
    pub total_savings: f64,
    /// Debt at month end.
    pub total_debt: f64,
    /// Distinct income sources.
    pub income_source_count: u32,
    /// Marketable skills in the household.
    pub skill_count: u32,
    /// Members without income.
    pub dependent_count: u32,
    /// Members with income.
    pub earner_count: u32,
    /// Savings divided by expenses.
    pub emergency_fund_ratio: f64,
    /// Debt divided by income.
    pub debt_burden_ratio: f64,
    /// Income sources relative to the target of three.
    pub income_diversity_score: f64,
    /// Skills relative to the target of five.
    pub skill_score: f64,
    /// Composite 0–100 score.
    pub resilience_score: f64,
    /// When the entry was first recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// First day of the month containing `date`.
pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// First day of the month before the month containing `date`.
pub fn previous_month(date: NaiveDate) -> Option<NaiveDate> {
    first_of_month(date).checked_sub_months(Months::new(1))
}

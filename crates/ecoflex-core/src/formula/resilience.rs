//! Monthly resilience score.

use chrono::NaiveDate;

use crate::api::TrackerEntryInput;
use crate::types::ResilienceEntry;

const TARGET_INCOME_SOURCES: f64 = 3.0;
const TARGET_SKILLS: f64 = 5.0;
/// Month-on-month change that moves the score by its full weight.
const DELTA_SCALE: f64 = 1000.0;

/// Figures the resilience score is computed from.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ResilienceInputs {
    /// Savings at month end.
    pub savings: f64,
    /// Spending during the month.
    pub expenses: f64,
    /// Distinct income sources.
    pub income_sources: u32,
    /// Marketable skills.
    pub skills: u32,
    /// Savings gained since the previous month.
    pub delta_savings: f64,
    /// Debt paid down since the previous month.
    pub delta_debt: f64,
}

impl ResilienceInputs {
    fn emergency_fund_ratio(&self) -> f64 {
        if self.expenses > 0.0 {
            self.savings / self.expenses
        } else {
            0.0
        }
    }

    fn income_diversity(&self) -> f64 {
        (f64::from(self.income_sources) / TARGET_INCOME_SOURCES).min(1.0)
    }

    fn skill_score(&self) -> f64 {
        (f64::from(self.skills) / TARGET_SKILLS).min(1.0)
    }
}

/// Composite 0–100 score for one month.
///
/// Weights: emergency fund 25, income diversity 25, skills 20, savings
/// growth 15 and debt reduction 15 (both per ₹1000 of change).
pub fn resilience_score(inputs: &ResilienceInputs) -> f64 {
    let score = 25.0 * inputs.emergency_fund_ratio().min(1.0)
        + 25.0 * inputs.income_diversity()
        + 20.0 * inputs.skill_score()
        + 15.0 * (inputs.delta_savings / DELTA_SCALE)
        + 15.0 * (inputs.delta_debt / DELTA_SCALE);
    score.clamp(0.0, 100.0)
}

/// Builds the tracker entry for `month` from the submitted figures and the
/// previous month's entry, if there is one.
///
/// Missing income source count defaults to one, missing skill count to zero,
/// and the stored entry carries the effective values.
pub fn record_month(
    input: &TrackerEntryInput,
    month: NaiveDate,
    previous: Option<&ResilienceEntry>,
) -> ResilienceEntry {
    let income = input.total_income.unwrap_or(0.0);
    let expenses = input.total_expenses.unwrap_or(0.0);
    let savings = input.total_savings.unwrap_or(0.0);
    let debt = input.total_debt.unwrap_or(0.0);

    let inputs = ResilienceInputs {
        savings,
        expenses,
        income_sources: input.income_source_count.unwrap_or(1),
        skills: input.skill_count.unwrap_or(0),
        delta_savings: previous.map_or(0.0, |p| savings - p.total_savings),
        delta_debt: previous.map_or(0.0, |p| p.total_debt - debt),
    };

    ResilienceEntry {
        id: None,
        month,
        total_income: income,
        total_expenses: expenses,
        total_savings: savings,
        total_debt: debt,
        income_source_count: inputs.income_sources,
        skill_count: inputs.skills,
        dependent_count: input.dependent_count.unwrap_or(0),
        earner_count: input.earner_count.unwrap_or(0),
        emergency_fund_ratio: inputs.emergency_fund_ratio(),
        debt_burden_ratio: if income > 0.0 { debt / income } else { 0.0 },
        income_diversity_score: inputs.income_diversity(),
        skill_score: inputs.skill_score(),
        resilience_score: resilience_score(&inputs),
        created_at: None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn month(m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, 1).unwrap()
    }

    fn input(savings: f64, expenses: f64, debt: f64) -> TrackerEntryInput {
        TrackerEntryInput {
            total_income: Some(30000.0),
            total_expenses: Some(expenses),
            total_savings: Some(savings),
            total_debt: Some(debt),
            income_source_count: Some(2),
            skill_count: Some(3),
            ..Default::default()
        }
    }

    #[test]
    fn test_score_components() {
        let inputs = ResilienceInputs {
            savings: 10000.0,
            expenses: 20000.0,
            income_sources: 2,
            skills: 3,
            delta_savings: 0.0,
            delta_debt: 0.0,
        };
        // 12.5 + 16.667 + 12 = 41.1667
        let score = resilience_score(&inputs);
        assert!((score - 41.1667).abs() < 1e-3);
    }

    #[test]
    fn test_score_clamped() {
        let rich = ResilienceInputs {
            savings: 1e6,
            expenses: 1.0,
            income_sources: 9,
            skills: 9,
            delta_savings: 1e6,
            delta_debt: 0.0,
        };
        assert_eq!(resilience_score(&rich), 100.0);

        let collapsing = ResilienceInputs {
            delta_savings: -50000.0,
            ..Default::default()
        };
        assert_eq!(resilience_score(&collapsing), 0.0);
    }

    #[test]
    fn test_first_month_has_no_deltas() {
        let entry = record_month(&input(10000.0, 20000.0, 5000.0), month(1), None);
        assert!((entry.resilience_score - 41.1667).abs() < 1e-3);
        assert_eq!(entry.emergency_fund_ratio, 0.5);
        assert!((entry.debt_burden_ratio - 1.0 / 6.0).abs() < 1e-9);
        assert_eq!(entry.month, month(1));
    }

    #[test]
    fn test_previous_month_deltas() {
        let prev = record_month(&input(10000.0, 20000.0, 5000.0), month(1), None);
        // +1000 savings, -1000 debt: +15 +15
        let entry = record_month(&input(11000.0, 20000.0, 4000.0), month(2), Some(&prev));
        // 25 * 0.55 + 16.667 + 12 + 15 + 15
        assert!((entry.resilience_score - 72.4167).abs() < 1e-3);
    }

    #[test]
    fn test_defaults_for_missing_counts() {
        let bare = TrackerEntryInput {
            total_savings: Some(0.0),
            total_expenses: Some(0.0),
            ..Default::default()
        };
        let entry = record_month(&bare, month(3), None);
        assert_eq!(entry.income_source_count, 1);
        assert_eq!(entry.skill_count, 0);
        assert_eq!(entry.emergency_fund_ratio, 0.0);
        assert!((entry.resilience_score - 25.0 / 3.0).abs() < 1e-9);
    }
}

//! Opportunity (investment) simulation.

use std::fmt;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::{RiskLevel, household_totals, round_to, round1, round2};
use crate::types::{FamilyMember, FinancialProfile};
use crate::{Error, Result};

/// Break-even beyond which an opportunity is not worth quoting.
const ADVISABLE_LIMIT_MONTHS: f64 = 50.0;
/// Break-even used when the opportunity adds no expected income.
const NEVER_BREAKS_EVEN: f64 = 999.0;
const WORTH_IT_MONTHS: f64 = 12.0;

/// An investment the household is considering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Opportunity {
    /// Up-front cost paid from savings.
    pub investment_cost: f64,
    /// Monthly income gain if it succeeds.
    pub expected_income_increase: f64,
    /// Chance of success in `[0, 1]`.
    pub success_probability: f64,
}

impl Opportunity {
    /// Rejects negative amounts and probabilities outside `[0, 1]`.
    pub fn validate(&self) -> Result<()> {
        if !self.investment_cost.is_finite() || self.investment_cost < 0.0 {
            return Err(Error::validation_field(
                "investmentCost",
                "Investment cost must be zero or more",
            ));
        }
        if !self.expected_income_increase.is_finite() || self.expected_income_increase < 0.0 {
            return Err(Error::validation_field(
                "expectedIncomeIncrease",
                "Expected income increase must be zero or more",
            ));
        }
        if !(0.0..=1.0).contains(&self.success_probability) {
            return Err(Error::validation_field(
                "successProbability",
                "Success probability must be between 0 and 1",
            ));
        }
        Ok(())
    }
}

/// Months until the investment pays for itself.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BreakEven {
    /// Months, one decimal.
    Months(f64),
    /// Longer than the advisable limit, or never.
    NotAdvisable,
}

impl BreakEven {
    fn from_months(months: f64) -> Self {
        if months > ADVISABLE_LIMIT_MONTHS {
            BreakEven::NotAdvisable
        } else {
            BreakEven::Months(round1(months))
        }
    }
}

impl fmt::Display for BreakEven {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BreakEven::Months(m) => write!(f, "{m}"),
            BreakEven::NotAdvisable => f.write_str("Not advisable"),
        }
    }
}

impl Serialize for BreakEven {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            BreakEven::Months(m) => serializer.serialize_f64(*m),
            BreakEven::NotAdvisable => serializer.serialize_str("Not advisable"),
        }
    }
}

impl<'de> Deserialize<'de> for BreakEven {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        match serde_json::Value::deserialize(deserializer)? {
            serde_json::Value::Number(n) => n
                .as_f64()
                .map(BreakEven::Months)
                .ok_or_else(|| D::Error::custom("break-even out of range")),
            serde_json::Value::String(s) if s.eq_ignore_ascii_case("not advisable") => {
                Ok(BreakEven::NotAdvisable)
            }
            other => Err(D::Error::custom(format!("invalid break-even {other}"))),
        }
    }
}

/// Result of `POST /opportunity-simulate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpportunityOutcome {
    /// Earner income today.
    pub current_income: f64,
    /// Income plus the probability-weighted increase, two decimals.
    pub new_expected_income: f64,
    /// Up-front cost.
    pub investment_cost: f64,
    /// Months to recover the cost.
    pub break_even_months: BreakEven,
    /// Months of expenses covered by savings today.
    pub survival_before_investment: f64,
    /// Months of expenses covered after paying the cost.
    pub survival_after_investment: f64,
    /// Income minus expenses today.
    pub monthly_savings_before: f64,
    /// Expected income minus expenses.
    pub monthly_savings_after: f64,
    /// Overall risk.
    pub risk_level: RiskLevel,
    /// Whether the opportunity pays off within a year and improves the
    /// monthly balance.
    #[serde(default)]
    pub worth_it: bool,
    /// Advice shown to the household.
    pub recommendation: String,
}

/// Evaluates an investment against the household's current position.
///
/// The opportunity must already be validated. Missing expenses and savings
/// count as zero.
pub fn simulate_opportunity(
    profile: &FinancialProfile,
    members: &[FamilyMember],
    opportunity: &Opportunity,
) -> OpportunityOutcome {
    let (savings, expenses, current_income) = household_totals(profile, members, 0.0);
    let cost = opportunity.investment_cost;

    let expected_increase = opportunity.success_probability * opportunity.expected_income_increase;
    let new_income = current_income + expected_increase;

    let break_even = if expected_increase > 0.0 {
        cost / expected_increase
    } else {
        NEVER_BREAKS_EVEN
    };

    let savings_after = savings - cost;
    let (survival_before, survival_after) = if expenses > 0.0 {
        (savings / expenses, savings_after.max(0.0) / expenses)
    } else {
        (0.0, 0.0)
    };

    let monthly_before = current_income - expenses;
    let monthly_after = new_income - expenses;

    let risk = if break_even < 3.0 && savings_after > 0.0 {
        RiskLevel::Low
    } else if break_even < 6.0 {
        RiskLevel::Medium
    } else {
        RiskLevel::High
    };

    let worth_it = break_even < WORTH_IT_MONTHS && monthly_after > monthly_before;
    let recommendation = if worth_it {
        format!(
            "✅ This opportunity looks financially sound. Break-even in {} months.",
            round_to(break_even, 0) as i64
        )
    } else {
        "⚠️ High risk. Ensure you have enough savings buffer before investing.".to_string()
    };

    OpportunityOutcome {
        current_income,
        new_expected_income: round2(new_income),
        investment_cost: cost,
        break_even_months: BreakEven::from_months(break_even),
        survival_before_investment: round1(survival_before),
        survival_after_investment: round1(survival_after),
        monthly_savings_before: round2(monthly_before),
        monthly_savings_after: round2(monthly_after),
        risk_level: risk,
        worth_it,
        recommendation,
    }
}

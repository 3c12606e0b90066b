//! Shock simulation.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::{RiskLevel, Survival, format_amount, household_totals, round2};
use crate::types::{FamilyMember, FinancialProfile};

const PART_TIME_INCOME: f64 = 5000.0;
const EXPENSE_CUT: f64 = 0.8;
/// Survival reported when income covers expenses.
const NO_DEFICIT_MONTHS: f64 = 99.0;

/// A financial shock the household wants to test against.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ShockKind {
    /// All earner income stops.
    JobLoss,
    /// Income falls by a fifth.
    IncomeDrop20,
    /// Income falls by thirty percent.
    IncomeDrop30,
    /// One-off medical bill paid from savings.
    MedicalEmergency,
    /// One-off relocation cost paid from savings.
    MigrationCost,
    /// Recurring monthly increase in school fees.
    SchoolFeeIncrease,
    /// Anything else; simulated with no change.
    Custom(String),
}

impl ShockKind {
    /// Built-in shocks in menu order.
    pub const BUILT_IN: [ShockKind; 6] = [
        ShockKind::JobLoss,
        ShockKind::IncomeDrop20,
        ShockKind::IncomeDrop30,
        ShockKind::MedicalEmergency,
        ShockKind::MigrationCost,
        ShockKind::SchoolFeeIncrease,
    ];

    /// Parses a shock name case-insensitively; unknown names become
    /// [`ShockKind::Custom`].
    pub fn parse(name: &str) -> Self {
        let upper = name.trim().to_ascii_uppercase();
        Self::BUILT_IN
            .into_iter()
            .find(|k| k.code() == upper)
            .unwrap_or_else(|| ShockKind::Custom(name.trim().to_string()))
    }

    /// Wire code, e.g. `JOB_LOSS`.
    pub fn code(&self) -> &str {
        match self {
            ShockKind::JobLoss => "JOB_LOSS",
            ShockKind::IncomeDrop20 => "INCOME_DROP_20",
            ShockKind::IncomeDrop30 => "INCOME_DROP_30",
            ShockKind::MedicalEmergency => "MEDICAL_EMERGENCY",
            ShockKind::MigrationCost => "MIGRATION_COST",
            ShockKind::SchoolFeeIncrease => "SCHOOL_FEE_INCREASE",
            ShockKind::Custom(name) => name,
        }
    }

    /// Whether the shock uses an amount.
    pub fn takes_amount(&self) -> bool {
        matches!(
            self,
            ShockKind::MedicalEmergency | ShockKind::MigrationCost | ShockKind::SchoolFeeIncrease
        )
    }

    /// Human-readable description; amount-based shocks quote the amount.
    pub fn describe(&self, amount: f64) -> String {
        let amount = format_amount(amount);
        match self {
            ShockKind::JobLoss => "Complete Job Loss".into(),
            ShockKind::IncomeDrop20 => "20% Income Drop".into(),
            ShockKind::IncomeDrop30 => "30% Income Drop".into(),
            ShockKind::MedicalEmergency => format!("Medical Emergency ₹{amount}"),
            ShockKind::MigrationCost => format!("Migration Cost ₹{amount}"),
            ShockKind::SchoolFeeIncrease => format!("School Fee Increase ₹{amount}/month"),
            ShockKind::Custom(_) => "Custom Shock".into(),
        }
    }
}

impl fmt::Display for ShockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl Serialize for ShockKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

impl<'de> Deserialize<'de> for ShockKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(|s| ShockKind::parse(&s))
    }
}

/// One way of coping with the shock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Strategy {
    /// Strategy name.
    pub strategy: String,
    /// Survival under this strategy.
    pub survival_months: Survival,
    /// Risk under this strategy.
    pub risk_level: RiskLevel,
}

/// Result of `POST /shock-simulate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShockOutcome {
    /// Description of the shock.
    pub shock_type: String,
    /// Earner income before the shock.
    pub original_income: f64,
    /// Earner income after the shock, two decimals.
    pub new_income: f64,
    /// Expenses before the shock.
    pub original_expenses: f64,
    /// Expenses after the shock.
    pub new_expenses: f64,
    /// Savings after the shock, never negative.
    pub new_savings: f64,
    /// Monthly shortfall after the shock.
    pub monthly_deficit: f64,
    /// How long savings cover the shortfall.
    pub survival_months: Survival,
    /// Risk band of the baseline survival.
    pub risk_level: RiskLevel,
    /// Coping strategies, in fixed order.
    pub strategies: Vec<Strategy>,
}

fn risk_for(survival: f64) -> RiskLevel {
    if survival < 2.0 {
        RiskLevel::High
    } else if survival < 4.0 {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

fn survival_against(savings: f64, deficit: f64) -> f64 {
    if deficit > 0.0 {
        savings / deficit
    } else {
        NO_DEFICIT_MONTHS
    }
}

/// Projects how a household fares under `kind`.
///
/// `amount` is only read by amount-based shocks. Non-earning members are
/// ignored. Missing expenses and savings count as zero.
pub fn simulate_shock(
    profile: &FinancialProfile,
    members: &[FamilyMember],
    kind: &ShockKind,
    amount: f64,
) -> ShockOutcome {
    let (savings, expenses, income) = household_totals(profile, members, 0.0);

    let (new_income, new_expenses, new_savings) = match kind {
        ShockKind::JobLoss => (0.0, expenses, savings),
        ShockKind::IncomeDrop20 => (income * 0.8, expenses, savings),
        ShockKind::IncomeDrop30 => (income * 0.7, expenses, savings),
        ShockKind::MedicalEmergency | ShockKind::MigrationCost => {
            (income, expenses, savings - amount)
        }
        ShockKind::SchoolFeeIncrease => (income, expenses + amount, savings),
        ShockKind::Custom(_) => (income, expenses, savings),
    };
    let remaining = new_savings.max(0.0);

    let deficit = (new_expenses - new_income).max(0.0);
    let survival = survival_against(remaining, deficit);
    let risk = risk_for(survival);

    // Measured against the gap left after the cut, even when the cut turns
    // the shortfall into a surplus.
    let reduced_survival = if deficit > 0.0 {
        survival_against(remaining, (new_income - new_expenses * EXPENSE_CUT).abs())
    } else {
        NO_DEFICIT_MONTHS
    };

    let part_time = if new_income + PART_TIME_INCOME >= new_expenses {
        (Survival::Stable, RiskLevel::Low)
    } else {
        // A part-time job that does not close the gap is not credited.
        (Survival::from_months(survival), RiskLevel::Medium)
    };

    let strategies = vec![
        Strategy {
            strategy: "Use Only Savings".into(),
            survival_months: Survival::from_months(survival),
            risk_level: risk,
        },
        Strategy {
            strategy: "Reduce Expenses by 20%".into(),
            survival_months: Survival::from_months(reduced_survival),
            risk_level: if reduced_survival > 4.0 {
                RiskLevel::Low
            } else {
                RiskLevel::Medium
            },
        },
        Strategy {
            strategy: format!("Add Part-Time Job (₹{}/month)", format_amount(PART_TIME_INCOME)),
            survival_months: part_time.0,
            risk_level: part_time.1,
        },
        Strategy {
            strategy: "Enroll in Government Scheme".into(),
            survival_months: Survival::AtLeast(6),
            risk_level: RiskLevel::Medium,
        },
    ];

    ShockOutcome {
        shock_type: kind.describe(amount),
        original_income: income,
        new_income: round2(new_income),
        original_expenses: expenses,
        new_expenses,
        new_savings: remaining,
        monthly_deficit: deficit,
        survival_months: Survival::from_months(survival),
        risk_level: risk,
        strategies,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn household(savings: f64, expenses: f64, incomes: &[f64]) -> (FinancialProfile, Vec<FamilyMember>) {
        let profile = FinancialProfile {
            total_savings: Some(savings),
            monthly_expenses: Some(expenses),
            ..Default::default()
        };
        let mut members: Vec<FamilyMember> = incomes
            .iter()
            .map(|&income| FamilyMember {
                is_earner: true,
                monthly_income: Some(income),
                ..Default::default()
            })
            .collect();
        // A dependent whose stray income must not count.
        members.push(FamilyMember {
            monthly_income: Some(99999.0),
            ..Default::default()
        });
        (profile, members)
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(ShockKind::parse("job_loss"), ShockKind::JobLoss);
        assert_eq!(ShockKind::parse(" Income_Drop_30 "), ShockKind::IncomeDrop30);
        assert_eq!(ShockKind::parse("flood"), ShockKind::Custom("flood".into()));
    }

    #[test]
    fn test_job_loss() {
        let (fp, members) = household(60000.0, 20000.0, &[25000.0]);
        let out = simulate_shock(&fp, &members, &ShockKind::JobLoss, 0.0);
        assert_eq!(out.shock_type, "Complete Job Loss");
        assert_eq!(out.original_income, 25000.0);
        assert_eq!(out.new_income, 0.0);
        assert_eq!(out.monthly_deficit, 20000.0);
        assert_eq!(out.survival_months, Survival::Months(3.0));
        assert_eq!(out.risk_level, RiskLevel::Medium);

        let names: Vec<&str> = out.strategies.iter().map(|s| s.strategy.as_str()).collect();
        assert_eq!(
            names,
            [
                "Use Only Savings",
                "Reduce Expenses by 20%",
                "Add Part-Time Job (₹5000/month)",
                "Enroll in Government Scheme"
            ]
        );
        // 60000 / 16000
        assert_eq!(out.strategies[1].survival_months, Survival::Months(3.8));
        assert_eq!(out.strategies[1].risk_level, RiskLevel::Medium);
        // 5000 does not close a 20000 gap, so the baseline stands.
        assert_eq!(out.strategies[2].survival_months, Survival::Months(3.0));
        assert_eq!(out.strategies[2].risk_level, RiskLevel::Medium);
        assert_eq!(out.strategies[3].survival_months, Survival::AtLeast(6));
    }

    #[test]
    fn test_income_drop_without_deficit_is_stable() {
        let (fp, members) = household(10000.0, 10000.0, &[20000.0]);
        let out = simulate_shock(&fp, &members, &ShockKind::IncomeDrop20, 0.0);
        assert_eq!(out.new_income, 16000.0);
        assert_eq!(out.monthly_deficit, 0.0);
        assert_eq!(out.survival_months, Survival::Stable);
        assert_eq!(out.risk_level, RiskLevel::Low);
        assert_eq!(out.strategies[1].survival_months, Survival::Stable);
        assert_eq!(out.strategies[1].risk_level, RiskLevel::Low);
        assert_eq!(out.strategies[2].survival_months, Survival::Stable);
        assert_eq!(out.strategies[2].risk_level, RiskLevel::Low);
    }

    #[test]
    fn test_medical_emergency_beyond_savings() {
        let (fp, members) = household(20000.0, 15000.0, &[10000.0]);
        let out = simulate_shock(&fp, &members, &ShockKind::MedicalEmergency, 50000.0);
        assert_eq!(out.shock_type, "Medical Emergency ₹50000");
        assert_eq!(out.new_savings, 0.0);
        assert_eq!(out.survival_months, Survival::Months(0.0));
        assert_eq!(out.risk_level, RiskLevel::High);
    }

    #[test]
    fn test_school_fee_increase_adds_to_expenses() {
        let (fp, members) = household(30000.0, 15000.0, &[15000.0]);
        let out = simulate_shock(&fp, &members, &ShockKind::SchoolFeeIncrease, 3000.0);
        assert_eq!(out.shock_type, "School Fee Increase ₹3000/month");
        assert_eq!(out.new_expenses, 18000.0);
        assert_eq!(out.monthly_deficit, 3000.0);
        assert_eq!(out.survival_months, Survival::Months(10.0));
        assert_eq!(out.risk_level, RiskLevel::Low);
    }

    #[test]
    fn test_custom_shock_changes_nothing() {
        let (fp, members) = household(30000.0, 15000.0, &[10000.0]);
        let out = simulate_shock(&fp, &members, &ShockKind::parse("locusts"), 1000.0);
        assert_eq!(out.shock_type, "Custom Shock");
        assert_eq!(out.new_income, 10000.0);
        assert_eq!(out.new_expenses, 15000.0);
        assert_eq!(out.new_savings, 30000.0);
        // 30000 / 5000
        assert_eq!(out.survival_months, Survival::Months(6.0));
    }

    #[test]
    fn test_reduced_expenses_measured_against_remaining_gap() {
        // 0.8 * 12000 = 9600, leaving a 400 surplus: 5000 / 400
        let (fp, members) = household(5000.0, 12000.0, &[10000.0]);
        let out = simulate_shock(&fp, &members, &ShockKind::parse("none"), 0.0);
        assert_eq!(out.survival_months, Survival::Months(2.5));
        assert_eq!(out.strategies[1].survival_months, Survival::Months(12.5));
        assert_eq!(out.strategies[1].risk_level, RiskLevel::Low);
        // 10000 + 5000 covers 12000
        assert_eq!(out.strategies[2].survival_months, Survival::Stable);
        assert_eq!(out.strategies[2].risk_level, RiskLevel::Low);
    }

    #[test]
    fn test_reduced_expenses_exactly_balancing_is_stable() {
        // 0.8 * 12500 = 10000 income
        let (fp, members) = household(5000.0, 12500.0, &[10000.0]);
        let out = simulate_shock(&fp, &members, &ShockKind::parse("none"), 0.0);
        assert_eq!(out.strategies[1].survival_months, Survival::Stable);
    }

    #[test]
    fn test_part_time_short_of_expenses_keeps_baseline() {
        // 9000 + 5000 < 20000; baseline 30000 / 11000
        let (fp, members) = household(30000.0, 20000.0, &[9000.0]);
        let out = simulate_shock(&fp, &members, &ShockKind::parse("none"), 0.0);
        assert_eq!(out.survival_months, Survival::Months(2.7));
        assert_eq!(out.strategies[2].survival_months, Survival::Months(2.7));
        assert_eq!(out.strategies[2].risk_level, RiskLevel::Medium);
        // 30000 / |9000 - 16000|
        assert_eq!(out.strategies[1].survival_months, Survival::Months(4.3));
        assert_eq!(out.strategies[1].risk_level, RiskLevel::Low);
    }

    #[test]
    fn test_outcome_wire_shape() {
        let (fp, members) = household(60000.0, 20000.0, &[25000.0]);
        let out = simulate_shock(&fp, &members, &ShockKind::JobLoss, 0.0);
        let json = serde_json::to_value(&out).unwrap();
        assert_eq!(json["shockType"], "Complete Job Loss");
        assert_eq!(json["riskLevel"], "MEDIUM");
        assert_eq!(json["strategies"][3]["survivalMonths"], "6+");
    }
}

//! Household finances and family members.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Error;
use crate::serde_util::{lenient_enum, lenient_f64, lenient_u32};

/// How a member earns their income.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IncomeType {
    /// Paid per day of work.
    DailyWage,
    /// Fixed monthly salary.
    Salary,
    /// Owns a business.
    Business,
    /// Freelance or own-account work.
    SelfEmployed,
}

impl IncomeType {
    /// All income types in menu order.
    pub const ALL: [IncomeType; 4] = [
        IncomeType::DailyWage,
        IncomeType::Salary,
        IncomeType::Business,
        IncomeType::SelfEmployed,
    ];

    /// Wire and storage representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            IncomeType::DailyWage => "DAILY_WAGE",
            IncomeType::Salary => "SALARY",
            IncomeType::Business => "BUSINESS",
            IncomeType::SelfEmployed => "SELF_EMPLOYED",
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            IncomeType::DailyWage => "Daily Wage",
            IncomeType::Salary => "Fixed Salary",
            IncomeType::Business => "Business",
            IncomeType::SelfEmployed => "Self Employed",
        }
    }
}

impl fmt::Display for IncomeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IncomeType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase().replace([' ', '-'], "_");
        IncomeType::ALL
            .into_iter()
            .find(|t| t.as_str() == upper)
            .ok_or_else(|| Error::validation_field("incomeType", format!("unknown income type '{s}'")))
    }
}

/// How predictable a member's income is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IncomeStability {
    /// Regular, reliable income.
    Stable,
    /// Mostly regular with some gaps.
    SemiStable,
    /// Depends on the season or on daily availability of work.
    Seasonal,
}

/// Weight applied when stability is unknown; same as seasonal.
pub(crate) const DEFAULT_STABILITY_VALUE: f64 = 0.4;

impl IncomeStability {
    /// All stability levels in menu order.
    pub const ALL: [IncomeStability; 3] = [
        IncomeStability::Stable,
        IncomeStability::SemiStable,
        IncomeStability::Seasonal,
    ];

    /// Numeric weight used by the Income Stability Factor.
    pub fn value(&self) -> f64 {
        match self {
            IncomeStability::Stable => 0.9,
            IncomeStability::SemiStable => 0.7,
            IncomeStability::Seasonal => DEFAULT_STABILITY_VALUE,
        }
    }

    /// Weight of an optional stability; unknown counts as seasonal.
    pub fn value_of(stability: Option<IncomeStability>) -> f64 {
        stability.map_or(DEFAULT_STABILITY_VALUE, |s| s.value())
    }

    /// Wire and storage representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            IncomeStability::Stable => "STABLE",
            IncomeStability::SemiStable => "SEMI_STABLE",
            IncomeStability::Seasonal => "SEASONAL",
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            IncomeStability::Stable => "Stable",
            IncomeStability::SemiStable => "Semi-Stable",
            IncomeStability::Seasonal => "Seasonal",
        }
    }
}

impl fmt::Display for IncomeStability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IncomeStability {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase().replace([' ', '-'], "_");
        IncomeStability::ALL
            .into_iter()
            .find(|t| t.as_str() == upper)
            .ok_or_else(|| {
                Error::validation_field("incomeStability", format!("unknown stability '{s}'"))
            })
    }
}

/// Household address and money summary, one per account.
///
/// Every field is optional because the wizard allows partial saves; the
/// formulas substitute defaults for missing amounts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialProfile {
    /// Database identifier; absent on input.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Family or household name.
    #[serde(default)]
    pub family_name: Option<String>,
    /// Street address.
    #[serde(default)]
    pub address: Option<String>,
    /// City.
    #[serde(default)]
    pub city: Option<String>,
    /// State or province.
    #[serde(default)]
    pub state: Option<String>,
    /// Postal code.
    #[serde(default)]
    pub pincode: Option<String>,
    /// Liquid savings.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub total_savings: Option<f64>,
    /// Outstanding debt.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub total_debt: Option<f64>,
    /// Total monthly spending.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub monthly_expenses: Option<f64>,
    /// Monthly rent.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub rent_amount: Option<f64>,
    /// Monthly school fees.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub school_fees: Option<f64>,
    /// Monthly loan instalment.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub emi_amount: Option<f64>,
    /// Last save time, stamped by storage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl FinancialProfile {
    /// Rejects negative money amounts.
    pub fn validate(&self) -> crate::Result<()> {
        let amounts = [
            ("totalSavings", self.total_savings),
            ("totalDebt", self.total_debt),
            ("monthlyExpenses", self.monthly_expenses),
            ("rentAmount", self.rent_amount),
            ("schoolFees", self.school_fees),
            ("emiAmount", self.emi_amount),
        ];
        for (field, value) in amounts {
            if let Some(v) = value {
                if !v.is_finite() || v < 0.0 {
                    return Err(Error::validation_field(
                        field,
                        format!("{field} must be a non-negative amount"),
                    ));
                }
            }
        }
        Ok(())
    }
}

/// One person in the household.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilyMember {
    /// Database identifier; absent on input.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Full name.
    #[serde(default)]
    pub full_name: Option<String>,
    /// Age in years.
    #[serde(default, deserialize_with = "lenient_u32")]
    pub age: Option<u32>,
    /// Gender as entered.
    #[serde(default)]
    pub gender: Option<String>,
    /// Highest education level.
    #[serde(default)]
    pub education_level: Option<String>,
    /// Whether the member brings in income.
    #[serde(default)]
    pub is_earner: bool,
    /// Kind of income (earners only).
    #[serde(default, deserialize_with = "lenient_enum")]
    pub income_type: Option<IncomeType>,
    /// Monthly income (earners only).
    #[serde(default, deserialize_with = "lenient_f64")]
    pub monthly_income: Option<f64>,
    /// Income predictability (earners only).
    #[serde(default, deserialize_with = "lenient_enum")]
    pub income_stability: Option<IncomeStability>,
    /// Comma-separated skills, e.g. "Tailoring, Driving".
    #[serde(default)]
    pub skills: Option<String>,
}

impl FamilyMember {
    /// Number of non-blank entries in the comma-separated skill list.
    pub fn skill_count(&self) -> usize {
        self.skills
            .as_deref()
            .map(|s| s.split(',').filter(|skill| !skill.trim().is_empty()).count())
            .unwrap_or(0)
    }

    /// Monthly income, zero when not given.
    pub fn income(&self) -> f64 {
        self.monthly_income.unwrap_or(0.0)
    }

    /// Rejects negative income and nonsensical ages.
    pub fn validate(&self) -> crate::Result<()> {
        if let Some(income) = self.monthly_income {
            if !income.is_finite() || income < 0.0 {
                return Err(Error::validation_field(
                    "monthlyIncome",
                    "monthlyIncome must be a non-negative amount",
                ));
            }
        }
        if matches!(self.age, Some(age) if age > 150) {
            return Err(Error::validation_field("age", "age must be at most 150"));
        }
        Ok(())
    }
}

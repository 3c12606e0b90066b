//! Scoring and simulation formulas.
//!
//! Everything here is a pure function of a household's
//! [`FinancialProfile`] and its [`FamilyMember`]s (or of a month of tracker
//! figures). The server calls these after loading records from storage; no
//! function in this module performs I/O.
//!
//! - [`economic_flexibility`]: the Economic Flexibility Score (EFS)
//! - [`simulate_shock`]: survival under a financial shock, with strategies
//! - [`simulate_opportunity`]: break-even analysis of an investment
//! - [`resilience_score`] / [`record_month`]: the monthly resilience tracker

mod efs;
mod opportunity;
mod resilience;
mod rounding;
mod shock;

#[cfg(test)]
mod proptests;

use std::fmt;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::types::{FamilyMember, FinancialProfile};

pub use efs::{EconomicScore, EfsRisk, economic_flexibility};
pub use opportunity::{BreakEven, Opportunity, OpportunityOutcome, simulate_opportunity};
pub use resilience::{ResilienceInputs, record_month, resilience_score};
pub use rounding::{format_amount, round_to, round1, round2};
pub use shock::{ShockKind, ShockOutcome, Strategy, simulate_shock};

/// Three-level risk used by the shock and opportunity simulations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    /// Comfortable margin.
    Low,
    /// Some exposure.
    Medium,
    /// Little or no margin.
    High,
}

impl RiskLevel {
    /// Wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Survival months beyond which a household is reported as stable.
pub const STABLE_THRESHOLD_MONTHS: f64 = 50.0;

/// How long savings last, as reported to the household.
///
/// On the wire this is a number of months, the string `"Stable"`, or an
/// open-ended `"N+"`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Survival {
    /// Income covers expenses, or savings last longer than
    /// [`STABLE_THRESHOLD_MONTHS`].
    Stable,
    /// Months of savings, one decimal.
    Months(f64),
    /// At least this many months.
    AtLeast(u32),
}

impl Survival {
    /// Classifies a raw month count and rounds it for display.
    pub fn from_months(months: f64) -> Self {
        if months > STABLE_THRESHOLD_MONTHS {
            Survival::Stable
        } else {
            Survival::Months(round1(months))
        }
    }

    /// Numeric view used for risk bands and charts.
    pub fn months(&self) -> f64 {
        match self {
            Survival::Stable => f64::INFINITY,
            Survival::Months(m) => *m,
            Survival::AtLeast(n) => f64::from(*n),
        }
    }
}

impl fmt::Display for Survival {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Survival::Stable => f.write_str("Stable"),
            Survival::Months(m) => write!(f, "{m}"),
            Survival::AtLeast(n) => write!(f, "{n}+"),
        }
    }
}

impl Serialize for Survival {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Survival::Months(m) => serializer.serialize_f64(*m),
            other => serializer.collect_str(other),
        }
    }
}

impl<'de> Deserialize<'de> for Survival {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(f64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(m) => Ok(Survival::Months(m)),
            Raw::Text(s) => {
                let s = s.trim();
                if s.eq_ignore_ascii_case("stable") {
                    Ok(Survival::Stable)
                } else if let Some(n) = s.strip_suffix('+') {
                    n.trim()
                        .parse()
                        .map(Survival::AtLeast)
                        .map_err(|_| D::Error::custom(format!("invalid survival '{s}'")))
                } else {
                    s.parse()
                        .map(Survival::Months)
                        .map_err(|_| D::Error::custom(format!("invalid survival '{s}'")))
                }
            }
        }
    }
}

/// Members flagged as earners.
pub(crate) fn earners(members: &[FamilyMember]) -> impl Iterator<Item = &FamilyMember> {
    members.iter().filter(|m| m.is_earner)
}

/// Sum of the earners' monthly income.
pub(crate) fn earner_income(members: &[FamilyMember]) -> f64 {
    earners(members).map(FamilyMember::income).sum()
}

/// Savings, expenses and income after substituting defaults for missing
/// amounts; `default_expenses` differs between the score and simulations.
pub(crate) fn household_totals(
    profile: &FinancialProfile,
    members: &[FamilyMember],
    default_expenses: f64,
) -> (f64, f64, f64) {
    (
        profile.total_savings.unwrap_or(0.0),
        profile.monthly_expenses.unwrap_or(default_expenses),
        earner_income(members),
    )
}

//! Economic Flexibility Score.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{earners, household_totals, round1, round2};
use crate::types::{FamilyMember, FinancialProfile, IncomeStability};

const EBR_WEIGHT: f64 = 0.4;
const IDS_WEIGHT: f64 = 0.2;
const DR_WEIGHT: f64 = 0.2;
const ISF_WEIGHT: f64 = 0.2;

/// Cap applied to the buffer and dependency ratios, and to the score.
const RATIO_CAP: f64 = 2.0;
const TARGET_INCOME_SOURCES: f64 = 3.0;
const TARGET_SKILLS: f64 = 5.0;

/// Overall band of an EFS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EfsRisk {
    /// EFS below 0.5.
    #[serde(rename = "HIGH RISK")]
    HighRisk,
    /// EFS from 0.5 up to 1.0.
    #[serde(rename = "MODERATE")]
    Moderate,
    /// EFS of 1.0 or more.
    #[serde(rename = "STRONG")]
    Strong,
}

impl EfsRisk {
    /// Band for a clamped score.
    pub fn for_score(efs: f64) -> Self {
        if efs < 0.5 {
            EfsRisk::HighRisk
        } else if efs < 1.0 {
            EfsRisk::Moderate
        } else {
            EfsRisk::Strong
        }
    }

    /// Wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            EfsRisk::HighRisk => "HIGH RISK",
            EfsRisk::Moderate => "MODERATE",
            EfsRisk::Strong => "STRONG",
        }
    }
}

impl fmt::Display for EfsRisk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Breakdown returned by `GET /economic-score`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EconomicScore {
    /// Clamped score in `[0, 2]`, two decimals.
    pub economic_flexibility_score: f64,
    /// Band of the score.
    pub risk_level: EfsRisk,
    /// Savings over monthly expenses.
    pub emergency_buffer_ratio: f64,
    /// Earners relative to three income sources.
    pub income_diversity_score: f64,
    /// Dependents per earner.
    pub dependency_ratio: f64,
    /// Mean stability weight of the earners.
    pub income_stability_factor: f64,
    /// Earner skills relative to five.
    pub skill_score: f64,
    /// Sum of earner income.
    pub total_income: f64,
    /// Monthly expenses used in the calculation.
    pub total_expenses: f64,
    /// Savings used in the calculation.
    pub total_savings: f64,
    /// Outstanding debt.
    pub total_debt: f64,
    /// Months the savings cover expenses, one decimal.
    pub survival_months: f64,
    /// Members who earn.
    pub earner_count: u32,
    /// Members who do not earn.
    pub dependent_count: u32,
}

/// Computes the Economic Flexibility Score of a household.
///
/// Missing savings and debt count as zero; missing expenses count as one
/// rupee so the buffer ratio stays finite. With zero expenses the buffer
/// ratio saturates at its cap when there are any savings at all.
pub fn economic_flexibility(profile: &FinancialProfile, members: &[FamilyMember]) -> EconomicScore {
    let (savings, expenses, income) = household_totals(profile, members, 1.0);
    let debt = profile.total_debt.unwrap_or(0.0);

    let earning: Vec<&FamilyMember> = earners(members).collect();
    let earner_count = earning.len();
    let dependent_count = members.len() - earner_count;

    let ebr = if expenses > 0.0 {
        savings / expenses
    } else if savings > 0.0 {
        RATIO_CAP
    } else {
        0.0
    };

    let ids = (earner_count as f64 / TARGET_INCOME_SOURCES).min(1.0);

    let dr = if earner_count > 0 {
        dependent_count as f64 / earner_count as f64
    } else {
        dependent_count as f64
    };

    let isf = if earning.is_empty() {
        IncomeStability::value_of(None)
    } else {
        earning
            .iter()
            .map(|m| IncomeStability::value_of(m.income_stability))
            .sum::<f64>()
            / earner_count as f64
    };

    let total_skills: usize = earning.iter().map(|m| m.skill_count()).sum();
    let skill_score = (total_skills as f64 / TARGET_SKILLS).min(1.0);

    let raw = EBR_WEIGHT * ebr.min(RATIO_CAP) + IDS_WEIGHT * ids - DR_WEIGHT * dr.min(RATIO_CAP)
        + ISF_WEIGHT * isf;
    let efs = raw.clamp(0.0, RATIO_CAP);

    let survival = if expenses > 0.0 { savings / expenses } else { 0.0 };

    EconomicScore {
        economic_flexibility_score: round2(efs),
        risk_level: EfsRisk::for_score(efs),
        emergency_buffer_ratio: round2(ebr),
        income_diversity_score: round2(ids),
        dependency_ratio: round2(dr),
        income_stability_factor: round2(isf),
        skill_score: round2(skill_score),
        total_income: income,
        total_expenses: expenses,
        total_savings: savings,
        total_debt: debt,
        survival_months: round1(survival),
        earner_count: earner_count as u32,
        dependent_count: dependent_count as u32,
    }
}

//! Row structs and their mapping to domain types.

use chrono::{DateTime, NaiveDate, Utc};
use ecoflex_core::{FamilyMember, FinancialProfile, ResilienceEntry, Role, User};
use sqlx::FromRow;

use crate::{Error, Result};

fn count(value: i64) -> u32 {
    u32::try_from(value).unwrap_or(0)
}

fn parse_opt<T>(table: &'static str, value: Option<String>) -> Result<Option<T>>
where
    T: std::str::FromStr<Err = ecoflex_core::Error>,
{
    value
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<T>())
        .transpose()
        .map_err(|e| Error::corrupt(table, e.to_string()))
}

#[derive(Debug, FromRow)]
pub(crate) struct UserRow {
    id: i64,
    username: String,
    email: String,
    phone: Option<String>,
    role: String,
    name: Option<String>,
    city: Option<String>,
    password_hash: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = Error;

    fn try_from(row: UserRow) -> Result<Self> {
        let role = row
            .role
            .parse::<Role>()
            .map_err(|e| Error::corrupt("users", e.to_string()))?;
        Ok(User {
            id: row.id,
            username: row.username,
            email: row.email,
            phone: row.phone,
            role,
            name: row.name,
            city: row.city,
            password_hash: row.password_hash,
            created_at: Some(row.created_at),
        })
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct ProfileRow {
    id: i64,
    family_name: Option<String>,
    address: Option<String>,
    city: Option<String>,
    state: Option<String>,
    pincode: Option<String>,
    total_savings: Option<f64>,
    total_debt: Option<f64>,
    monthly_expenses: Option<f64>,
    rent_amount: Option<f64>,
    school_fees: Option<f64>,
    emi_amount: Option<f64>,
    updated_at: DateTime<Utc>,
}

impl From<ProfileRow> for FinancialProfile {
    fn from(row: ProfileRow) -> Self {
        FinancialProfile {
            id: Some(row.id),
            family_name: row.family_name,
            address: row.address,
            city: row.city,
            state: row.state,
            pincode: row.pincode,
            total_savings: row.total_savings,
            total_debt: row.total_debt,
            monthly_expenses: row.monthly_expenses,
            rent_amount: row.rent_amount,
            school_fees: row.school_fees,
            emi_amount: row.emi_amount,
            updated_at: Some(row.updated_at),
        }
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct MemberRow {
    id: i64,
    full_name: Option<String>,
    age: Option<i64>,
    gender: Option<String>,
    education_level: Option<String>,
    is_earner: bool,
    income_type: Option<String>,
    monthly_income: Option<f64>,
    income_stability: Option<String>,
    skills: Option<String>,
}

impl TryFrom<MemberRow> for FamilyMember {
    type Error = Error;

    fn try_from(row: MemberRow) -> Result<Self> {
        Ok(FamilyMember {
            id: Some(row.id),
            full_name: row.full_name,
            age: row.age.map(count),
            gender: row.gender,
            education_level: row.education_level,
            is_earner: row.is_earner,
            income_type: parse_opt("family_members", row.income_type)?,
            monthly_income: row.monthly_income,
            income_stability: parse_opt("family_members", row.income_stability)?,
            skills: row.skills,
        })
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct TrackerRow {
    id: i64,
    month: NaiveDate,
    total_income: f64,
    total_expenses: f64,
    total_savings: f64,
    total_debt: f64,
    income_source_count: i64,
    skill_count: i64,
    dependent_count: i64,
    earner_count: i64,
    emergency_fund_ratio: f64,
    debt_burden_ratio: f64,
    income_diversity_score: f64,
    skill_score: f64,
    resilience_score: f64,
    created_at: DateTime<Utc>,
}

impl From<TrackerRow> for ResilienceEntry {
    fn from(row: TrackerRow) -> Self {
        ResilienceEntry {
            id: Some(row.id),
            month: row.month,
            total_income: row.total_income,
            total_expenses: row.total_expenses,
            total_savings: row.total_savings,
            total_debt: row.total_debt,
            income_source_count: count(row.income_source_count),
            skill_count: count(row.skill_count),
            dependent_count: count(row.dependent_count),
            earner_count: count(row.earner_count),
            emergency_fund_ratio: row.emergency_fund_ratio,
            debt_burden_ratio: row.debt_burden_ratio,
            income_diversity_score: row.income_diversity_score,
            skill_score: row.skill_score,
            resilience_score: row.resilience_score,
            created_at: Some(row.created_at),
        }
    }
}

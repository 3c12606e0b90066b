//! Request and response bodies of the REST contract.
//!
//! These types are the only thing the server and its clients share. Field
//! names are camelCase on the wire to stay compatible with the browser front
//! end, and numeric request fields go through the lenient deserializers in
//! [`crate::serde_util`] because forms post numbers as strings.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::formula::{Opportunity, ShockKind};
use crate::serde_util::{
    empty_object_as_none, lenient_date, lenient_enum, lenient_f64, lenient_u32,
    none_as_empty_object,
};
use crate::types::{FamilyMember, FinancialProfile, Role, User};
use crate::{Error, Result};

/// Body of `POST /profile/financial`.
pub type FinancialProfileInput = FinancialProfile;

/// One element of the `POST /profile/members` body.
pub type MemberInput = FamilyMember;

const MIN_PASSWORD_LEN: usize = 6;

fn required<'a>(field: &str, label: &str, value: &'a str) -> Result<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::validation_field(field, format!("{label} is required")));
    }
    Ok(trimmed)
}

/// Body of `POST /auth/register`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    /// Desired login name.
    #[serde(default)]
    pub username: String,
    /// Plain-text password.
    #[serde(default)]
    pub password: String,
    /// E-mail address.
    #[serde(default)]
    pub email: String,
    /// Phone number.
    #[serde(default)]
    pub phone: Option<String>,
    /// Account type; `INDIVIDUAL` when absent.
    #[serde(default, deserialize_with = "lenient_enum")]
    pub role: Option<Role>,
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Home city.
    #[serde(default)]
    pub city: Option<String>,
}

impl RegisterRequest {
    /// Checks required fields and basic formats.
    pub fn validate(&self) -> Result<()> {
        required("username", "Username", &self.username)?;
        let email = required("email", "Email", &self.email)?;
        if !email.contains('@') {
            return Err(Error::validation_field("email", "Email address is not valid"));
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(Error::validation_field(
                "password",
                format!("Password must be at least {MIN_PASSWORD_LEN} characters"),
            ));
        }
        Ok(())
    }

    /// Role with the default applied.
    pub fn role(&self) -> Role {
        self.role.unwrap_or_default()
    }
}

/// Body of `POST /auth/login`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoginRequest {
    /// Login name.
    #[serde(default)]
    pub username: String,
    /// Plain-text password.
    #[serde(default)]
    pub password: String,
}

/// Successful login.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    /// Bearer token for subsequent requests.
    pub token: String,
    /// Login name.
    pub username: String,
    /// Account type.
    pub role: Role,
    /// Account id.
    pub user_id: i64,
}

/// Envelope used for acknowledgements and errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T = serde_json::Value> {
    /// Whether the request succeeded.
    pub success: bool,
    /// Message for the user.
    pub message: String,
    /// Saved record, when there is one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// Success without data.
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
        }
    }

    /// Success carrying the saved record.
    pub fn with_data(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }

    /// Failure.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
        }
    }
}

/// Account details as shown on the profile page.
///
/// Name and city are empty strings rather than `null` when unset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserView {
    /// Account id.
    pub id: i64,
    /// Login name.
    pub username: String,
    /// E-mail address.
    pub email: String,
    /// Phone number.
    pub phone: Option<String>,
    /// Account type.
    pub role: Role,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Home city.
    #[serde(default)]
    pub city: String,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            phone: user.phone.clone(),
            role: user.role,
            name: user.name.clone().unwrap_or_default(),
            city: user.city.clone().unwrap_or_default(),
        }
    }
}

/// Response of `GET /profile`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileView {
    /// Account details.
    pub user: UserView,
    /// Household finances; `{}` on the wire when not yet saved.
    #[serde(
        default,
        serialize_with = "none_as_empty_object",
        deserialize_with = "empty_object_as_none"
    )]
    pub financial_profile: Option<FinancialProfile>,
    /// Family members.
    #[serde(default)]
    pub members: Vec<FamilyMember>,
    /// Both wizard steps have been saved.
    pub profile_complete: bool,
}

impl ProfileView {
    /// Assembles the view; the profile is complete once finances exist and
    /// at least one member has been saved.
    pub fn new(user: &User, profile: Option<FinancialProfile>, members: Vec<FamilyMember>) -> Self {
        let profile_complete = profile.is_some() && !members.is_empty();
        Self {
            user: UserView::from(user),
            financial_profile: profile,
            members,
            profile_complete,
        }
    }
}

/// Body of `POST /shock-simulate`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShockRequest {
    /// Shock code such as `JOB_LOSS`.
    #[serde(default)]
    pub shock_type: String,
    /// Amount for amount-based shocks.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub shock_value: Option<f64>,
}

impl ShockRequest {
    /// Parses the shock and its amount (zero when absent).
    pub fn parse(&self) -> Result<(ShockKind, f64)> {
        let code = required("shockType", "Shock type", &self.shock_type)?;
        let amount = self.shock_value.unwrap_or(0.0);
        if !amount.is_finite() || amount < 0.0 {
            return Err(Error::validation_field(
                "shockValue",
                "Shock amount must be zero or more",
            ));
        }
        Ok((ShockKind::parse(code), amount))
    }
}

/// Body of `POST /opportunity-simulate`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpportunityRequest {
    /// Up-front cost.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub investment_cost: Option<f64>,
    /// Monthly income gain on success.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub expected_income_increase: Option<f64>,
    /// Chance of success in `[0, 1]`.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub success_probability: Option<f64>,
}

impl OpportunityRequest {
    /// Checks that all fields are present and in range.
    pub fn to_opportunity(&self) -> Result<Opportunity> {
        let investment_cost = self.investment_cost.ok_or_else(|| {
            Error::validation_field("investmentCost", "Investment cost is required")
        })?;
        let expected_income_increase = self.expected_income_increase.ok_or_else(|| {
            Error::validation_field(
                "expectedIncomeIncrease",
                "Expected income increase is required",
            )
        })?;
        let success_probability = self.success_probability.ok_or_else(|| {
            Error::validation_field("successProbability", "Success probability is required")
        })?;
        let opportunity = Opportunity {
            investment_cost,
            expected_income_increase,
            success_probability,
        };
        opportunity.validate()?;
        Ok(opportunity)
    }
}

/// Body of `POST /resilience-tracker`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackerEntryInput {
    /// Month being recorded; `YYYY-MM` or any day in it.
    #[serde(default, deserialize_with = "lenient_date")]
    pub month: Option<NaiveDate>,
    /// Income received.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub total_income: Option<f64>,
    /// Spending.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub total_expenses: Option<f64>,
    /// Savings at month end.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub total_savings: Option<f64>,
    /// Debt at month end.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub total_debt: Option<f64>,
    /// Distinct income sources.
    #[serde(default, deserialize_with = "lenient_u32")]
    pub income_source_count: Option<u32>,
    /// Marketable skills.
    #[serde(default, deserialize_with = "lenient_u32")]
    pub skill_count: Option<u32>,
    /// Members without income.
    #[serde(default, deserialize_with = "lenient_u32")]
    pub dependent_count: Option<u32>,
    /// Members with income.
    #[serde(default, deserialize_with = "lenient_u32")]
    pub earner_count: Option<u32>,
}

impl TrackerEntryInput {
    /// Savings and expenses are required; all amounts must be non-negative.
    pub fn validate(&self) -> Result<()> {
        if self.total_savings.is_none() {
            return Err(Error::validation_field("totalSavings", "Total savings is required"));
        }
        if self.total_expenses.is_none() {
            return Err(Error::validation_field(
                "totalExpenses",
                "Total expenses is required",
            ));
        }
        let amounts = [
            ("totalIncome", self.total_income),
            ("totalExpenses", self.total_expenses),
            ("totalSavings", self.total_savings),
            ("totalDebt", self.total_debt),
        ];
        for (field, value) in amounts {
            if matches!(value, Some(v) if !v.is_finite() || v < 0.0) {
                return Err(Error::validation_field(
                    field,
                    format!("{field} must be a non-negative amount"),
                ));
            }
        }
        Ok(())
    }
}

/// Response of `POST /resilience-tracker`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackerSaved {
    /// Always `true`.
    pub success: bool,
    /// Score of the saved month, one decimal.
    pub resilience_score: f64,
    /// Confirmation text.
    pub message: String,
}

/// Response of `GET /health`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    /// `"ok"` when the database answers.
    pub status: String,
    /// Server version.
    pub version: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn register(username: &str, email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.into(),
            email: email.into(),
            password: password.into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_register_validation() {
        assert!(register("asha", "asha@example.org", "secret1").validate().is_ok());
        let err = register("  ", "asha@example.org", "secret1").validate().unwrap_err();
        assert_eq!(err.to_string(), "Username is required");
        assert!(register("asha", "not-an-email", "secret1").validate().is_err());
        assert!(register("asha", "asha@example.org", "123").validate().is_err());
    }

    #[test]
    fn test_register_role_defaults_and_parses() {
        let req: RegisterRequest =
            serde_json::from_value(json!({"username": "a", "role": ""})).unwrap();
        assert_eq!(req.role(), Role::Individual);
        let req: RegisterRequest =
            serde_json::from_value(json!({"username": "a", "role": "family"})).unwrap();
        assert_eq!(req.role(), Role::Family);
    }

    #[test]
    fn test_api_response_omits_missing_data() {
        let json = serde_json::to_value(ApiResponse::<()>::error("Invalid username or password"))
            .unwrap();
        assert_eq!(
            json,
            json!({"success": false, "message": "Invalid username or password"})
        );
    }

    #[test]
    fn test_profile_view_completion() {
        let user = User {
            id: 7,
            username: "ravi".into(),
            email: "ravi@example.org".into(),
            phone: Some("98765".into()),
            role: Role::Family,
            name: None,
            city: None,
            password_hash: String::new(),
            created_at: None,
        };
        let empty = ProfileView::new(&user, None, vec![]);
        assert!(!empty.profile_complete);
        let json = serde_json::to_value(&empty).unwrap();
        assert_eq!(json["financialProfile"], json!({}));
        assert_eq!(json["user"]["name"], "");
        assert_eq!(json["user"]["role"], "FAMILY");

        let only_finances = ProfileView::new(&user, Some(FinancialProfile::default()), vec![]);
        assert!(!only_finances.profile_complete);

        let done = ProfileView::new(
            &user,
            Some(FinancialProfile::default()),
            vec![FamilyMember::default()],
        );
        assert!(done.profile_complete);
    }

    #[test]
    fn test_shock_request_parse() {
        let req: ShockRequest =
            serde_json::from_value(json!({"shockType": "medical_emergency", "shockValue": "25000"}))
                .unwrap();
        let (kind, amount) = req.parse().unwrap();
        assert_eq!(kind, ShockKind::MedicalEmergency);
        assert_eq!(amount, 25000.0);

        let req: ShockRequest = serde_json::from_value(json!({"shockType": "JOB_LOSS"})).unwrap();
        assert_eq!(req.parse().unwrap().1, 0.0);

        assert!(ShockRequest::default().parse().is_err());
    }

    #[test]
    fn test_opportunity_request_requires_all_fields() {
        let req: OpportunityRequest = serde_json::from_value(json!({
            "investmentCost": "10000",
            "expectedIncomeIncrease": 5000,
            "successProbability": "0.8"
        }))
        .unwrap();
        let opp = req.to_opportunity().unwrap();
        assert_eq!(opp.success_probability, 0.8);

        let req: OpportunityRequest =
            serde_json::from_value(json!({"investmentCost": 100})).unwrap();
        let err = req.to_opportunity().unwrap_err();
        assert_eq!(err.to_string(), "Expected income increase is required");
    }

    #[test]
    fn test_tracker_input_validation() {
        let req: TrackerEntryInput = serde_json::from_value(json!({
            "month": "2024-03",
            "totalIncome": "30000",
            "totalExpenses": "20000",
            "totalSavings": "15000",
            "totalDebt": "",
            "incomeSourceCount": "2",
            "skillCount": ""
        }))
        .unwrap();
        assert!(req.validate().is_ok());
        assert_eq!(req.month, NaiveDate::from_ymd_opt(2024, 3, 1));
        assert_eq!(req.skill_count, None);

        let missing = TrackerEntryInput {
            total_expenses: Some(1.0),
            ..Default::default()
        };
        assert_eq!(
            missing.validate().unwrap_err().to_string(),
            "Total savings is required"
        );
    }
}

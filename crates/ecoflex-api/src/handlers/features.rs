//! Score, shock and opportunity endpoints.
//!
//! Each reads the caller's saved household and runs the matching formula
//! from `ecoflex_core::formula`; nothing is persisted.

use axum::Json;
use axum::extract::State;
use ecoflex_auth::AuthenticatedUser;
use ecoflex_core::api::{OpportunityRequest, ShockRequest};
use ecoflex_core::formula::{
    EconomicScore, OpportunityOutcome, ShockOutcome, economic_flexibility, simulate_opportunity,
    simulate_shock,
};
use ecoflex_core::{FamilyMember, FinancialProfile};

use crate::extract::ApiJson;
use crate::state::SharedState;
use crate::{Error, Result};

async fn household(
    state: &SharedState,
    user_id: i64,
) -> Result<Option<(FinancialProfile, Vec<FamilyMember>)>> {
    let Some(profile) = state.store.financial_profile(user_id).await? else {
        return Ok(None);
    };
    let members = state.store.members(user_id).await?;
    Ok(Some((profile, members)))
}

/// GET /api/economic-score - Economic Flexibility Score breakdown
pub async fn economic_score(
    State(state): State<SharedState>,
    auth: AuthenticatedUser,
) -> Result<Json<EconomicScore>> {
    let (profile, members) = household(&state, auth.user_id)
        .await?
        .ok_or(Error::ProfileRequired)?;
    let score = economic_flexibility(&profile, &members);
    tracing::debug!(
        user_id = auth.user_id,
        efs = score.economic_flexibility_score,
        "economic score computed"
    );
    Ok(Json(score))
}

/// POST /api/shock-simulate - Survival projection under a shock
pub async fn shock(
    State(state): State<SharedState>,
    auth: AuthenticatedUser,
    ApiJson(request): ApiJson<ShockRequest>,
) -> Result<Json<ShockOutcome>> {
    let (kind, amount) = request.parse()?;
    let (profile, members) = household(&state, auth.user_id)
        .await?
        .ok_or(ecoflex_core::Error::ProfileIncomplete)?;
    let outcome = simulate_shock(&profile, &members, &kind, amount);
    tracing::debug!(user_id = auth.user_id, shock = kind.code(), "shock simulated");
    Ok(Json(outcome))
}

/// POST /api/opportunity-simulate - Break-even analysis of an investment
pub async fn opportunity(
    State(state): State<SharedState>,
    auth: AuthenticatedUser,
    ApiJson(request): ApiJson<OpportunityRequest>,
) -> Result<Json<OpportunityOutcome>> {
    let opportunity = request.to_opportunity()?;
    let (profile, members) = household(&state, auth.user_id)
        .await?
        .ok_or(ecoflex_core::Error::ProfileIncomplete)?;
    Ok(Json(simulate_opportunity(&profile, &members, &opportunity)))
}

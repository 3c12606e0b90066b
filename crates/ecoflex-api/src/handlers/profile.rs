//! Household profile and family members.

use axum::Json;
use axum::extract::State;
use ecoflex_auth::{AuthError, AuthenticatedUser};
use ecoflex_core::api::{ApiResponse, FinancialProfileInput, MemberInput, ProfileView};
use ecoflex_core::{FamilyMember, FinancialProfile};

use crate::Result;
use crate::extract::ApiJson;
use crate::state::SharedState;

/// GET /api/profile - Account, financial profile and members in one view
pub async fn get_profile(
    State(state): State<SharedState>,
    auth: AuthenticatedUser,
) -> Result<Json<ProfileView>> {
    // A valid token for a deleted account is treated like no session.
    let user = state
        .store
        .find_user(auth.user_id)
        .await?
        .ok_or(AuthError::MissingToken)?;
    let profile = state.store.financial_profile(user.id).await?;
    let members = state.store.members(user.id).await?;
    Ok(Json(ProfileView::new(&user, profile, members)))
}

/// POST /api/profile/financial - Create or overwrite household details
pub async fn save_financial(
    State(state): State<SharedState>,
    auth: AuthenticatedUser,
    ApiJson(input): ApiJson<FinancialProfileInput>,
) -> Result<Json<ApiResponse<FinancialProfile>>> {
    input.validate()?;
    let saved = state
        .store
        .upsert_financial_profile(auth.user_id, &input)
        .await?;
    tracing::debug!(user_id = auth.user_id, "financial profile saved");
    Ok(Json(ApiResponse::with_data(
        "Financial profile saved successfully",
        saved,
    )))
}

/// POST /api/profile/members - Replace the whole member list
pub async fn save_members(
    State(state): State<SharedState>,
    auth: AuthenticatedUser,
    ApiJson(members): ApiJson<Vec<MemberInput>>,
) -> Result<Json<ApiResponse<Vec<FamilyMember>>>> {
    for member in &members {
        member.validate()?;
    }
    let saved = state.store.replace_members(auth.user_id, &members).await?;
    tracing::debug!(user_id = auth.user_id, count = saved.len(), "members replaced");
    Ok(Json(ApiResponse::with_data("Members saved successfully", saved)))
}

/// GET /api/profile/members - Current member list
pub async fn get_members(
    State(state): State<SharedState>,
    auth: AuthenticatedUser,
) -> Result<Json<Vec<FamilyMember>>> {
    Ok(Json(state.store.members(auth.user_id).await?))
}

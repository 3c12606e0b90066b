//! Monthly resilience tracker.

use axum::Json;
use axum::extract::State;
use chrono::Utc;
use ecoflex_auth::AuthenticatedUser;
use ecoflex_core::ResilienceEntry;
use ecoflex_core::api::{TrackerEntryInput, TrackerSaved};
use ecoflex_core::formula::{record_month, round1};
use ecoflex_core::types::{first_of_month, previous_month};

use crate::Result;
use crate::extract::ApiJson;
use crate::state::SharedState;

/// POST /api/resilience-tracker - Record (or overwrite) one month
pub async fn record(
    State(state): State<SharedState>,
    auth: AuthenticatedUser,
    ApiJson(input): ApiJson<TrackerEntryInput>,
) -> Result<Json<TrackerSaved>> {
    input.validate()?;
    let month = first_of_month(input.month.unwrap_or_else(|| Utc::now().date_naive()));

    let previous = match previous_month(month) {
        Some(prev) => state.store.tracker_entry(auth.user_id, prev).await?,
        None => None,
    };
    let entry = record_month(&input, month, previous.as_ref());
    let saved = state.store.upsert_tracker_entry(auth.user_id, &entry).await?;

    tracing::debug!(
        user_id = auth.user_id,
        month = %saved.month,
        score = saved.resilience_score,
        has_previous = previous.is_some(),
        "tracker entry saved"
    );
    Ok(Json(TrackerSaved {
        success: true,
        resilience_score: round1(saved.resilience_score),
        message: "Monthly data saved successfully".to_string(),
    }))
}

/// GET /api/resilience-tracker/history - Every month, oldest first
pub async fn history(
    State(state): State<SharedState>,
    auth: AuthenticatedUser,
) -> Result<Json<Vec<ResilienceEntry>>> {
    Ok(Json(state.store.tracker_history(auth.user_id).await?))
}

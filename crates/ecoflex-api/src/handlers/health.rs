//! `GET /api/health`.

use axum::Json;
use axum::extract::State;
use ecoflex_core::api::HealthStatus;
use http::StatusCode;

use crate::state::SharedState;

/// GET /api/health - Liveness plus a database round trip
pub async fn health(State(state): State<SharedState>) -> (StatusCode, Json<HealthStatus>) {
    let (code, status) = match state.store.ping().await {
        Ok(()) => (StatusCode::OK, "ok"),
        Err(e) => {
            tracing::warn!(error = %e, "health check: database unavailable");
            (StatusCode::SERVICE_UNAVAILABLE, "unavailable")
        }
    };
    (
        code,
        Json(HealthStatus {
            status: status.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }),
    )
}

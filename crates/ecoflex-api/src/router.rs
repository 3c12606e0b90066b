//! Axum router: maps URL paths to handlers.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use ecoflex_auth::{AuthConfig, AuthLayer};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{auth, features, health, profile, tracker};
use crate::state::{AppState, SharedState};

/// Build and return the full router, everything mounted under `/api`.
pub fn build_router(state: AppState, auth_config: AuthConfig) -> Router {
    let shared: SharedState = Arc::new(state);

    let public = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/health", get(health::health));

    let protected = Router::new()
        .route("/profile", get(profile::get_profile))
        .route("/profile/financial", post(profile::save_financial))
        .route(
            "/profile/members",
            get(profile::get_members).post(profile::save_members),
        )
        .route("/economic-score", get(features::economic_score))
        .route("/shock-simulate", post(features::shock))
        .route("/opportunity-simulate", post(features::opportunity))
        .route("/resilience-tracker", post(tracker::record))
        .route("/resilience-tracker/history", get(tracker::history))
        .layer(AuthLayer::new(shared.tokens.clone(), auth_config));

    Router::new()
        .nest("/api", public.merge(protected))
        // The browser frontend is served from another origin
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(shared)
}

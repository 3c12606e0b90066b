//! `POST /api/auth/register` and `POST /api/auth/login`.

use axum::Json;
use axum::extract::State;
use ecoflex_auth::AuthError;
use ecoflex_core::NewUser;
use ecoflex_core::api::{ApiResponse, AuthResponse, LoginRequest, RegisterRequest};

use crate::extract::ApiJson;
use crate::state::SharedState;
use crate::{Error, Result};

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// POST /api/auth/register - Create an account
pub async fn register(
    State(state): State<SharedState>,
    ApiJson(request): ApiJson<RegisterRequest>,
) -> Result<Json<ApiResponse>> {
    request.validate()?;
    let username = request.username.trim().to_string();
    let email = request.email.trim().to_string();

    if state.store.username_exists(&username).await? {
        return Err(Error::bad_request("Username already exists"));
    }
    if state.store.email_exists(&email).await? {
        return Err(Error::bad_request("Email already exists"));
    }

    let role = request.role();
    let password_hash = state.hash_password(request.password).await?;
    let user = state
        .store
        .create_user(&NewUser {
            username,
            email,
            phone: non_blank(request.phone),
            role,
            name: non_blank(request.name),
            city: non_blank(request.city),
            password_hash,
        })
        .await?;

    tracing::info!(user_id = user.id, username = %user.username, role = %user.role, "account registered");
    Ok(Json(ApiResponse::ok("Registration successful! Please login.")))
}

/// POST /api/auth/login - Exchange credentials for a bearer token
pub async fn login(
    State(state): State<SharedState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> Result<Json<AuthResponse>> {
    let user = state
        .store
        .find_user_by_username(request.username.trim())
        .await?
        .ok_or(AuthError::InvalidCredentials)?;

    if !state
        .verify_password(request.password, user.password_hash.clone())
        .await?
    {
        tracing::debug!(username = %user.username, "password mismatch");
        return Err(AuthError::InvalidCredentials.into());
    }

    let token = state.tokens.issue(user.id, &user.username, user.role)?;
    tracing::info!(user_id = user.id, "login");
    Ok(Json(AuthResponse {
        token,
        username: user.username,
        role: user.role,
        user_id: user.id,
    }))
}

//! Authenticated user identity and extraction helpers.

use axum::extract::FromRequestParts;
use ecoflex_core::Role;

use crate::AuthError;

/// An authenticated user identity, extracted from a validated token.
///
/// Stored in HTTP request extensions by the auth middleware. Handlers take it
/// as an extractor argument; when it is absent (no middleware, or auth
/// disabled) extraction fails with a 401.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    /// Account id (the `uid` claim).
    pub user_id: i64,
    /// Login name (the `sub` claim).
    pub username: String,
    /// Account type.
    pub role: Role,
}

/// Extract the `AuthenticatedUser` from HTTP request `Parts`, if present.
pub fn user_from_parts(parts: &http::request::Parts) -> Option<&AuthenticatedUser> {
    parts.extensions.get::<AuthenticatedUser>()
}

/// Extract the username from HTTP request `Parts`.
///
/// Returns `"anonymous"` if no authenticated user is present.
pub fn username_from_parts(parts: &http::request::Parts) -> &str {
    parts
        .extensions
        .get::<AuthenticatedUser>()
        .map(|u| u.username.as_str())
        .unwrap_or("anonymous")
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        user_from_parts(parts).cloned().ok_or(AuthError::MissingToken)
    }
}

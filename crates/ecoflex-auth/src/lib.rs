//! Authentication for EcoFlex.
//!
//! Provides:
//! - [`PasswordHasher`]: Argon2id hashing for stored credentials
//! - [`JwtIssuer`]: signs and verifies HS256 bearer tokens
//! - [`AuthenticatedUser`]: identity extracted from a validated token
//! - [`TokenValidator`]: trait for async token validation
//! - [`AuthLayer`] / [`AuthService`]: Tower middleware parameterised over `TokenValidator`
//! - [`AuthConfig`]: configuration for the auth layer
//! - [`AuthError`]: auth-specific error types

mod error;
mod jwt;
mod middleware;
mod password;
mod user;

pub use error::AuthError;
pub use jwt::{Claims, DEFAULT_TOKEN_TTL_HOURS, JwtIssuer};
pub use middleware::{AuthLayer, AuthService};
pub use password::PasswordHasher;
pub use user::{AuthenticatedUser, user_from_parts, username_from_parts};

/// Default token audience.
pub const DEFAULT_AUDIENCE: &str = "ecoflex";

/// Configuration for the auth middleware.
#[derive(Clone, Debug)]
pub struct AuthConfig {
    /// Whether authentication is enabled. When false, requests pass through
    /// without an identity.
    pub enabled: bool,
    /// Expected token audience.
    pub audience: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            audience: DEFAULT_AUDIENCE.to_string(),
        }
    }
}

/// Trait for validating tokens and extracting user identity.
///
/// The middleware calls `validate()` with the bearer token and returns
/// the authenticated user on success.
pub trait TokenValidator: Send + Sync + 'static {
    /// Validate a token and return the authenticated user.
    fn validate(
        &self,
        token: &str,
        config: &AuthConfig,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<AuthenticatedUser, AuthError>> + Send + '_>,
    >;
}

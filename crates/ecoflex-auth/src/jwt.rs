//! HS256 bearer tokens.
//!
//! Tokens carry the username as `sub` plus the account id and role, so the
//! server can authorize a request without a database round trip.

use std::future::Future;
use std::pin::Pin;

use ecoflex_core::Role;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::{AuthConfig, AuthError, AuthenticatedUser, TokenValidator};

/// Default token lifetime.
pub const DEFAULT_TOKEN_TTL_HOURS: u64 = 24;

/// Claims carried by an EcoFlex token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Username.
    pub sub: String,
    /// Account id.
    pub uid: i64,
    /// Account type.
    pub role: Role,
    /// Audience.
    pub aud: String,
    /// Issued at (seconds since the epoch).
    pub iat: u64,
    /// Expiry (seconds since the epoch).
    pub exp: u64,
}

/// Issues and verifies HS256 tokens with a shared secret.
#[derive(Clone)]
pub struct JwtIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    audience: String,
    ttl_secs: u64,
}

impl std::fmt::Debug for JwtIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtIssuer")
            .field("audience", &self.audience)
            .field("ttl_secs", &self.ttl_secs)
            .finish_non_exhaustive()
    }
}

impl JwtIssuer {
    /// Creates an issuer for `audience` signing with `secret`.
    pub fn new(secret: &[u8], audience: impl Into<String>, ttl_hours: u64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            audience: audience.into(),
            ttl_secs: ttl_hours.saturating_mul(3600),
        }
    }

    /// Signs a token for the given account.
    pub fn issue(&self, user_id: i64, username: &str, role: Role) -> Result<String, AuthError> {
        let iat = jsonwebtoken::get_current_timestamp();
        self.sign(&Claims {
            sub: username.to_string(),
            uid: user_id,
            role,
            aud: self.audience.clone(),
            iat,
            exp: iat.saturating_add(self.ttl_secs),
        })
    }

    /// Signs arbitrary claims.
    pub fn sign(&self, claims: &Claims) -> Result<String, AuthError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| AuthError::Encoding(e.to_string()))
    }

    /// Verifies signature, expiry and audience and returns the identity.
    pub fn verify(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[self.audience.as_str()]);

        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::Expired,
                ErrorKind::InvalidAudience => AuthError::InvalidAudience,
                ErrorKind::InvalidToken | ErrorKind::Base64(_) | ErrorKind::Json(_) => {
                    AuthError::InvalidFormat(e.to_string())
                }
                _ => AuthError::InvalidSignature(e.to_string()),
            }
        })?;

        Ok(AuthenticatedUser {
            user_id: data.claims.uid,
            username: data.claims.sub,
            role: data.claims.role,
        })
    }
}

impl TokenValidator for JwtIssuer {
    fn validate(
        &self,
        token: &str,
        _config: &AuthConfig,
    ) -> Pin<Box<dyn Future<Output = Result<AuthenticatedUser, AuthError>> + Send + '_>> {
        let result = self.verify(token);
        Box::pin(async move { result })
    }
}

//! Shared application state for the API server.

use std::sync::Arc;

use ecoflex_auth::{JwtIssuer, PasswordHasher};
use ecoflex_storage::EcoflexStore;

use crate::{Error, Result};

/// Shared state injected into every handler.
#[derive(Clone)]
pub struct AppState {
    /// System of record.
    pub store: Arc<dyn EcoflexStore>,
    /// Issues and verifies bearer tokens.
    pub tokens: Arc<JwtIssuer>,
    /// Argon2 credential hashing.
    pub passwords: PasswordHasher,
}

/// State as handed to the router.
pub type SharedState = Arc<AppState>;

impl AppState {
    /// Creates state over `store`, signing tokens with `tokens`.
    pub fn new(store: Arc<dyn EcoflexStore>, tokens: JwtIssuer) -> Self {
        Self {
            store,
            tokens: Arc::new(tokens),
            passwords: PasswordHasher::new(),
        }
    }

    /// Hashes on the blocking pool; Argon2 is CPU-bound.
    pub(crate) async fn hash_password(&self, password: String) -> Result<String> {
        let hasher = self.passwords.clone();
        let hash = tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| Error::Internal(format!("password hashing task failed: {e}")))??;
        Ok(hash)
    }

    /// Verifies on the blocking pool.
    pub(crate) async fn verify_password(&self, password: String, stored: String) -> Result<bool> {
        let hasher = self.passwords.clone();
        let matches = tokio::task::spawn_blocking(move || hasher.verify(&password, &stored))
            .await
            .map_err(|e| Error::Internal(format!("password check task failed: {e}")))??;
        Ok(matches)
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("tokens", &self.tokens)
            .finish_non_exhaustive()
    }
}

//! Server configuration.
//!
//! Loaded from `<config_dir>/ecoflex/server.toml` (or `--config` /
//! `ECOFLEX_CONFIG`), then overridden by `ECOFLEX_<SECTION>_<KEY>`
//! environment variables, the same names `to_env_vars` exports.

use ecoflex_auth::DEFAULT_TOKEN_TTL_HOURS;
use ecoflex_core::config::env_override;
use ecoflex_core::{ConfigManager, Error, Result};
use serde::{Deserialize, Serialize};

/// Shortest accepted HS256 secret, in bytes.
pub const MIN_SECRET_LEN: usize = 32;

/// Top-level server configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listener settings.
    pub server: ListenConfig,
    /// Database settings.
    pub database: DatabaseConfig,
    /// Token settings.
    pub auth: AuthSettings,
}

/// `[server]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListenConfig {
    /// Interface to bind.
    pub host: String,
    /// TCP port.
    pub port: u16,
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

/// `[database]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// sqlx SQLite URL.
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://ecoflex.db".to_string(),
        }
    }
}

/// `[auth]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    /// Require bearer tokens on protected routes.
    pub enabled: bool,
    /// HS256 signing secret.
    pub jwt_secret: String,
    /// Token lifetime.
    pub token_ttl_hours: u64,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            jwt_secret: String::new(),
            token_ttl_hours: DEFAULT_TOKEN_TTL_HOURS,
        }
    }
}

impl ServerConfig {
    /// `host:port` to bind.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Checks the settings that have no usable default.
    pub fn validate(&self) -> Result<()> {
        if self.auth.jwt_secret.len() < MIN_SECRET_LEN {
            return Err(Error::config(format!(
                "auth.jwt_secret must be at least {MIN_SECRET_LEN} bytes \
                 (set it in the config file or {}_AUTH_JWT_SECRET)",
                Self::env_prefix()
            )));
        }
        if self.auth.token_ttl_hours == 0 {
            return Err(Error::config("auth.token_ttl_hours must be positive"));
        }
        if self.database.url.trim().is_empty() {
            return Err(Error::config("database.url must not be empty"));
        }
        Ok(())
    }
}

impl ConfigManager for ServerConfig {
    fn file_name() -> &'static str {
        "server.toml"
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        let prefix = Self::env_prefix();
        if let Some(host) = env_override::<String>(&format!("{prefix}_SERVER_HOST"))? {
            self.server.host = host;
        }
        if let Some(port) = env_override(&format!("{prefix}_SERVER_PORT"))? {
            self.server.port = port;
        }
        if let Some(url) = env_override::<String>(&format!("{prefix}_DATABASE_URL"))? {
            self.database.url = url;
        }
        if let Some(enabled) = env_override(&format!("{prefix}_AUTH_ENABLED"))? {
            self.auth.enabled = enabled;
        }
        if let Some(secret) = env_override::<String>(&format!("{prefix}_AUTH_JWT_SECRET"))? {
            self.auth.jwt_secret = secret;
        }
        if let Some(ttl) = env_override(&format!("{prefix}_AUTH_TOKEN_TTL_HOURS"))? {
            self.auth.token_ttl_hours = ttl;
        }
        Ok(())
    }
}

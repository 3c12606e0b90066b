//! API server implementation

use std::sync::Arc;

use axum::Router;
use ecoflex_auth::{AuthConfig, DEFAULT_AUDIENCE, JwtIssuer};
use ecoflex_storage::SqliteStore;
use tokio::net::TcpListener;

use crate::{AppState, Result, ServerConfig, build_router};

/// EcoFlex API server
#[derive(Debug)]
pub struct Server {
    config: ServerConfig,
}

impl Server {
    /// Create a new server instance; fails on unusable configuration.
    pub fn new(config: ServerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Effective configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Auth layer settings derived from the `[auth]` section.
    pub fn auth_config(&self) -> AuthConfig {
        AuthConfig {
            enabled: self.config.auth.enabled,
            audience: DEFAULT_AUDIENCE.to_string(),
        }
    }

    /// Opens and migrates the database and builds the router.
    pub async fn router(&self) -> Result<Router> {
        let store = SqliteStore::connect(&self.config.database.url).await?;
        tracing::info!(url = %self.config.database.url, "database ready");

        let tokens = JwtIssuer::new(
            self.config.auth.jwt_secret.as_bytes(),
            DEFAULT_AUDIENCE,
            self.config.auth.token_ttl_hours,
        );
        if !self.config.auth.enabled {
            tracing::warn!("authentication disabled; protected routes will answer 401");
        }
        Ok(build_router(
            AppState::new(Arc::new(store), tokens),
            self.auth_config(),
        ))
    }

    /// Binds the configured address and serves until Ctrl-C.
    pub async fn run(self) -> Result<()> {
        let listener = TcpListener::bind(self.config.bind_addr()).await?;
        self.serve(listener).await
    }

    /// Serves on an already bound listener until Ctrl-C.
    pub async fn serve(self, listener: TcpListener) -> Result<()> {
        let app = self.router().await?;
        tracing::info!(addr = %listener.local_addr()?, "EcoFlex API listening");
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        tracing::info!("server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}

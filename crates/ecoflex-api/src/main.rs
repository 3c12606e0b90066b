//! EcoFlex API server
//!
//! Run with: cargo run -p ecoflex-api --bin ecoflex-server

use clap::Parser;
use ecoflex_api::{Server, ServerConfig};
use ecoflex_core::ConfigManager;
use tracing_subscriber::EnvFilter;

/// EcoFlex REST API
#[derive(Debug, Parser)]
#[command(name = "ecoflex-server", version, about)]
struct Args {
    /// Path to server.toml
    #[arg(short, long, env = "ECOFLEX_CONFIG")]
    config: Option<String>,

    /// Interface to bind (overrides [server].host)
    #[arg(long)]
    host: Option<String>,

    /// Port to bind (overrides [server].port)
    #[arg(short, long)]
    port: Option<u16>,

    /// sqlx SQLite URL (overrides [database].url)
    #[arg(long)]
    database_url: Option<String>,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    print_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,ecoflex=debug")),
        )
        .init();

    let args = Args::parse();
    let mut config = ServerConfig::load(args.config.as_deref())?;
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(url) = args.database_url {
        config.database.url = url;
    }

    if args.print_config {
        print!("{}", config.to_toml_string()?);
        return Ok(());
    }

    tracing::info!("Starting EcoFlex API server...");
    Server::new(config)?.run().await?;
    Ok(())
}

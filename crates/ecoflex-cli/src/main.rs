//! EcoFlex CLI
//!
//! Terminal front end for the EcoFlex API.

#![warn(clippy::all)]
#![forbid(unsafe_code)]

use std::process::ExitCode;

use clap::Parser;
use ecoflex_cli::prompt::TermPrompter;
use ecoflex_cli::{App, Cli, CliConfig};
use ecoflex_core::ConfigManager;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(error = ?e, "command failed");
            let message = match e.downcast_ref::<ecoflex_cli::Error>() {
                Some(cli_error) => cli_error.user_message(),
                None => format!("{e:#}"),
            };
            eprintln!("{}", console::style(message).red());
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = CliConfig::load(cli.config.as_deref())?;
    if let Some(url) = cli.api_url {
        config.api_url = url;
    }
    let app = App::new(config, cli.config)?;
    let mut prompter = TermPrompter::new();
    app.run(cli.command, &mut prompter).await?;
    Ok(())
}

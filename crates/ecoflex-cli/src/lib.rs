//! # ecoflex-cli
//!
//! Terminal front end for EcoFlex.
//!
//! The `ecoflex` binary talks to a running `ecoflex-server` through
//! [`ecoflex_client::EcoflexClient`] and renders the results:
//! - account registration, login and a persisted session
//! - the dashboard and the two-step profile wizard
//! - economic score, shock lab, opportunity mode and the resilience tracker
//! - `config` subcommands for the CLI's own TOML file
//!
//! All scoring happens on the server; this crate only collects input and
//! draws views.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod config_handlers;
pub mod error;
pub mod prompt;
pub mod session;
pub mod views;
pub mod wizard;

pub use cli::{Cli, Command};
pub use commands::App;
pub use config::CliConfig;
pub use error::{Error, Result};

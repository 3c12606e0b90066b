//! # ecoflex-api
//!
//! HTTP API server for EcoFlex.
//!
//! This crate implements the REST contract the presentation layer talks to:
//! - account registration and login (`/api/auth/*`)
//! - household profile and family members (`/api/profile*`)
//! - economic flexibility score, shock and opportunity simulation
//! - the monthly resilience tracker
//!
//! Everything except `/api/auth/*` and `/api/health` sits behind the bearer
//! token layer from `ecoflex-auth`.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod router;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use error::{Error, Result};
pub use router::build_router;
pub use server::Server;
pub use state::{AppState, SharedState};

//! # ecoflex-client
//!
//! Rust client library for the EcoFlex REST API.
//!
//! [`EcoflexClient`] wraps one `reqwest::Client` and exposes one async
//! method per route. Request and response bodies are the wire types from
//! `ecoflex_core::api` and `ecoflex_core::formula`, so the client never
//! computes anything itself.
//!
//! ```no_run
//! # async fn demo() -> ecoflex_client::Result<()> {
//! use ecoflex_client::EcoflexClient;
//! use ecoflex_core::api::LoginRequest;
//!
//! let mut client = EcoflexClient::new("http://localhost:8080/api")?;
//! let auth = client
//!     .login(&LoginRequest { username: "asha".into(), password: "secret123".into() })
//!     .await?;
//! client.set_token(Some(auth.token));
//! let score = client.economic_score().await?;
//! println!("EFS {}", score.economic_flexibility_score);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod client;
pub mod error;

pub use client::{DEFAULT_API_URL, EcoflexClient};
pub use error::{Error, Result};

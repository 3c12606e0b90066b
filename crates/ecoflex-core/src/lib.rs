//! EcoFlex Core: shared types, wire contract, formulas and errors.
//!
//! This crate is dependency level 0 for the workspace: the server, the
//! storage layer, the HTTP client and the terminal front end all build on
//! it.
//!
//! # Modules
//!
//! - [`types`]: Household, member, user and tracker records
//! - [`formula`]: Economic Flexibility Score, shock, opportunity and
//!   resilience calculations
//! - [`api`]: Request and response bodies of the REST contract
//! - [`config`]: TOML configuration management shared by the binaries
//! - [`serde_util`]: Lenient deserializers for form-style JSON input
//! - [`error`]: Error types and Result alias

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod api;
pub mod config;
pub mod error;
pub mod formula;
pub mod serde_util;
pub mod types;

// Re-export key types at crate root for convenience
pub use config::ConfigManager;
pub use error::{Error, Result};
pub use types::{
    FamilyMember, FinancialProfile, IncomeStability, IncomeType, NewUser, ResilienceEntry, Role,
    User,
};

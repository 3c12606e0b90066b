//! HTTP handlers for all API routes.

pub mod auth;
pub mod features;
pub mod health;
pub mod profile;
pub mod tracker;

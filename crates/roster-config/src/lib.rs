//! # Roster Config
//!
//! Configuration management for the Roster user directory.
//! Supports layered configuration from files, prefixed environment variables
//! and the legacy `DATABASE_URL` / `REDIS_*` variables.

mod app_config;
mod loader;
mod validation;

pub use app_config::*;
pub use loader::*;
pub use validation::*;

//! # Roster Server Library
//!
//! Dependency wiring, logging setup and the serve loop behind the
//! `roster-server` binary.

pub mod app;
pub mod di;
pub mod logging;
pub mod startup;

pub use app::AppBuilder;
pub use di::AppModule;

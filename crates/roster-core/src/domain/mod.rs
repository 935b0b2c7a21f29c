//! Domain entities for the user directory.

pub mod datetime;
mod user;

pub use user::*;

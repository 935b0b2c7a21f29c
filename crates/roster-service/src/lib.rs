//! # Roster Service
//!
//! Business logic service layer for the Roster user directory.
//! Owns the cache-aside read path for the user collection.

pub mod cache;
pub mod r#impl;
pub mod user_service;

pub use cache::*;
pub use r#impl::UserServiceImpl;
pub use user_service::*;

//! # Roster Core
//!
//! Core types, traits, and error definitions for the Roster user directory.
//! Every other crate in the workspace builds on the entity, the error enum and
//! the health-check seam defined here.

pub mod domain;
pub mod error;
pub mod id;
pub mod result;
pub mod traits;

pub use domain::*;
pub use error::*;
pub use id::*;
pub use result::*;
pub use traits::*;

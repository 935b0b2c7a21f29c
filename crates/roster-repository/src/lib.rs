//! # Roster Repository
//!
//! Data access for the `users` table.
//!
//! ```text
//! Service
//!   ↓  Arc<dyn UserRepository>  (domain interface)
//! PgUserRepository              (PostgreSQL / SQLx)
//!   ↓  DatabasePool
//! PostgreSQL
//! ```
//!
//! With the `test-support` feature, [`MemoryUserRepository`] provides an
//! in-process implementation with failure injection.

pub mod pool;
pub mod postgres;
pub mod traits;

#[cfg(any(test, feature = "test-support"))]
pub mod memory;

pub use pool::*;
pub use postgres::*;
pub use traits::*;

#[cfg(any(test, feature = "test-support"))]
pub use memory::MemoryUserRepository;

//! Cache interface trait for abstracted caching operations.

use async_trait::async_trait;
use roster_core::RosterResult;
use std::time::Duration;

/// Cache interface for storing and retrieving cached data.
///
/// Values are opaque strings; callers store pre-serialized JSON so a hit can be
/// returned without decoding it.
#[async_trait]
pub trait CacheInterface: Send + Sync {
    /// Get a raw value from the cache.
    ///
    /// Returns `None` if the key doesn't exist or has expired.
    async fn get_raw(&self, key: &str) -> RosterResult<Option<String>>;

    /// Set a raw value in the cache. `None` stores it without expiry.
    async fn set_raw(&self, key: &str, value: &str, ttl: Option<Duration>) -> RosterResult<()>;

    /// Reads the write generation counter; `0` when it was never bumped.
    async fn generation(&self, generation_key: &str) -> RosterResult<u64>;

    /// Stores `value` only if the generation counter still equals `expected`.
    ///
    /// The check and the write are one atomic step. Returns whether the value
    /// was written.
    async fn set_raw_if_generation(
        &self,
        key: &str,
        value: &str,
        ttl: Option<Duration>,
        generation_key: &str,
        expected: u64,
    ) -> RosterResult<bool>;

    /// Bumps the generation counter, then deletes `key`, atomically.
    ///
    /// A reader that sampled the old generation can no longer write its
    /// snapshot back.
    async fn invalidate(&self, key: &str, generation_key: &str) -> RosterResult<()>;

    /// Round-trips a `PING` to the backend.
    async fn ping(&self) -> RosterResult<()>;

    /// Check if caching is enabled.
    fn is_enabled(&self) -> bool;
}

//! In-process cache for tests.

use super::CacheInterface;
use async_trait::async_trait;
use roster_core::{RosterError, RosterResult};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;

#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<String, (String, Option<Duration>)>,
    generations: HashMap<String, u64>,
}

/// In-memory cache with failure injection.
///
/// TTLs are recorded but never enforced.
#[derive(Debug, Default)]
pub struct MemoryCacheService {
    state: Mutex<CacheState>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
}

impl MemoryCacheService {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `get_raw` and `generation` fail while set.
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Makes every write and `ping` fail while set.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of values actually stored.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Returns the stored value without touching the failure switches.
    pub async fn peek(&self, key: &str) -> Option<String> {
        self.state.lock().await.entries.get(key).map(|(v, _)| v.clone())
    }

    /// Returns the TTL the value under `key` was written with.
    pub async fn ttl_of(&self, key: &str) -> Option<Duration> {
        self.state.lock().await.entries.get(key).and_then(|(_, ttl)| *ttl)
    }

    /// Stores a value directly.
    pub async fn seed(&self, key: &str, value: &str) {
        self.state
            .lock()
            .await
            .entries
            .insert(key.to_string(), (value.to_string(), None));
    }

    fn check_reads(&self) -> RosterResult<()> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(RosterError::cache("connection refused"));
        }
        Ok(())
    }

    fn check_writes(&self) -> RosterResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(RosterError::cache("connection reset by peer"));
        }
        Ok(())
    }
}

#[async_trait]
impl CacheInterface for MemoryCacheService {
    fn is_enabled(&self) -> bool {
        true
    }

    async fn get_raw(&self, key: &str) -> RosterResult<Option<String>> {
        self.check_reads()?;
        Ok(self.peek(key).await)
    }

    async fn set_raw(&self, key: &str, value: &str, ttl: Option<Duration>) -> RosterResult<()> {
        self.check_writes()?;
        self.state
            .lock()
            .await
            .entries
            .insert(key.to_string(), (value.to_string(), ttl));
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn generation(&self, generation_key: &str) -> RosterResult<u64> {
        self.check_reads()?;
        let state = self.state.lock().await;
        Ok(state.generations.get(generation_key).copied().unwrap_or(0))
    }

    async fn set_raw_if_generation(
        &self,
        key: &str,
        value: &str,
        ttl: Option<Duration>,
        generation_key: &str,
        expected: u64,
    ) -> RosterResult<bool> {
        self.check_writes()?;
        let mut state = self.state.lock().await;
        if state.generations.get(generation_key).copied().unwrap_or(0) != expected {
            return Ok(false);
        }
        state
            .entries
            .insert(key.to_string(), (value.to_string(), ttl));
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(true)
    }

    async fn invalidate(&self, key: &str, generation_key: &str) -> RosterResult<()> {
        self.check_writes()?;
        let mut state = self.state.lock().await;
        *state.generations.entry(generation_key.to_string()).or_insert(0) += 1;
        state.entries.remove(key);
        Ok(())
    }

    async fn ping(&self) -> RosterResult<()> {
        self.check_writes()
    }
}

//! Redis-based cache implementation.

use super::CacheInterface;
use async_trait::async_trait;
use deadpool_redis::{
    redis::{self, AsyncCommands},
    Config, ConnectionAddr, ConnectionInfo, Pool, RedisConnectionInfo, Runtime,
};
use roster_config::RedisConfig;
use roster_core::{HealthCheck, HealthStatus, RosterError, RosterResult};
use std::time::Duration;
use tracing::{debug, info};

/// Stores the snapshot only while the generation counter is unchanged.
///
/// KEYS: snapshot, generation. ARGV: expected generation, payload, TTL seconds (0 = none).
const SET_IF_GENERATION: &str = r"
local current = redis.call('GET', KEYS[2]) or '0'
if current ~= ARGV[1] then
    return 0
end
if tonumber(ARGV[3]) > 0 then
    redis.call('SET', KEYS[1], ARGV[2], 'EX', ARGV[3])
else
    redis.call('SET', KEYS[1], ARGV[2])
end
return 1
";

/// Connection settings handed to the client as separate fields, so the
/// password reaches `AUTH` exactly as configured.
fn connection_info(config: &RedisConfig) -> ConnectionInfo {
    ConnectionInfo {
        addr: ConnectionAddr::Tcp(config.host.clone(), config.port),
        redis: RedisConnectionInfo {
            db: i64::from(config.db),
            password: config.auth_password().map(str::to_string),
            ..RedisConnectionInfo::default()
        },
    }
}

/// Creates a Redis connection pool and verifies it with a `PING`.
pub async fn create_redis_pool(config: &RedisConfig) -> RosterResult<Pool> {
    info!("Creating Redis connection pool at {}...", config.address());

    let pool = Config::from_connection_info(connection_info(config))
        .builder()
        .map_err(|e| RosterError::Configuration(format!("Invalid Redis config: {}", e)))?
        .max_size(config.pool_size)
        .runtime(Runtime::Tokio1)
        .build()
        .map_err(|e| RosterError::Configuration(format!("Failed to create Redis pool: {}", e)))?;

    RedisCacheService::new(pool.clone()).ping().await?;

    info!("Redis connection pool created successfully");
    Ok(pool)
}

/// Redis-based cache service.
#[derive(Clone)]
pub struct RedisCacheService {
    /// Redis connection pool; `None` when caching is disabled.
    pool: Option<Pool>,
}

impl RedisCacheService {
    /// Create a new Redis cache service.
    #[must_use]
    pub fn new(pool: Pool) -> Self {
        Self { pool: Some(pool) }
    }

    /// Create a no-op cache service (for when Redis is disabled).
    ///
    /// Every read misses and every write is dropped.
    #[must_use]
    pub fn disabled() -> Self {
        Self { pool: None }
    }

    /// Get a connection from the pool.
    async fn get_conn(&self) -> RosterResult<deadpool_redis::Connection> {
        match &self.pool {
            Some(pool) => pool.get().await.map_err(|e| {
                RosterError::Cache(format!("Failed to get Redis connection: {}", e))
            }),
            None => Err(RosterError::Cache("Cache is disabled".to_string())),
        }
    }
}

impl std::fmt::Debug for RedisCacheService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisCacheService")
            .field("enabled", &self.is_enabled())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl CacheInterface for RedisCacheService {
    fn is_enabled(&self) -> bool {
        self.pool.is_some()
    }

    async fn get_raw(&self, key: &str) -> RosterResult<Option<String>> {
        if !self.is_enabled() {
            return Ok(None);
        }

        let mut conn = self.get_conn().await?;
        let value: Option<String> = conn.get(key).await.map_err(|e| {
            RosterError::Cache(format!("Failed to get key '{}': {}", key, e))
        })?;

        match &value {
            Some(_) => debug!("Cache hit for key '{}'", key),
            None => debug!("Cache miss for key '{}'", key),
        }

        Ok(value)
    }

    async fn set_raw(&self, key: &str, value: &str, ttl: Option<Duration>) -> RosterResult<()> {
        if !self.is_enabled() {
            return Ok(());
        }

        let mut conn = self.get_conn().await?;
        let result = match ttl {
            Some(ttl) => {
                let ttl_secs = ttl.as_secs().max(1);
                conn.set_ex::<_, _, ()>(key, value, ttl_secs).await
            }
            None => conn.set::<_, _, ()>(key, value).await,
        };
        result.map_err(|e| RosterError::Cache(format!("Failed to set key '{}': {}", key, e)))?;

        debug!("Cached key '{}' with TTL {:?}", key, ttl);
        Ok(())
    }

    async fn generation(&self, generation_key: &str) -> RosterResult<u64> {
        if !self.is_enabled() {
            return Ok(0);
        }

        let mut conn = self.get_conn().await?;
        let generation: Option<u64> = conn.get(generation_key).await.map_err(|e| {
            RosterError::Cache(format!("Failed to read '{}': {}", generation_key, e))
        })?;
        Ok(generation.unwrap_or(0))
    }

    async fn set_raw_if_generation(
        &self,
        key: &str,
        value: &str,
        ttl: Option<Duration>,
        generation_key: &str,
        expected: u64,
    ) -> RosterResult<bool> {
        if !self.is_enabled() {
            return Ok(false);
        }

        let ttl_secs = ttl.map_or(0, |ttl| ttl.as_secs().max(1));

        let mut conn = self.get_conn().await?;
        let written: i64 = redis::cmd("EVAL")
            .arg(SET_IF_GENERATION)
            .arg(2)
            .arg(key)
            .arg(generation_key)
            .arg(expected)
            .arg(value)
            .arg(ttl_secs)
            .query_async(&mut *conn)
            .await
            .map_err(|e| RosterError::Cache(format!("Failed to set key '{}': {}", key, e)))?;

        debug!("Conditional set of '{}' at generation {}: {}", key, expected, written == 1);
        Ok(written == 1)
    }

    async fn invalidate(&self, key: &str, generation_key: &str) -> RosterResult<()> {
        if !self.is_enabled() {
            return Ok(());
        }

        let mut conn = self.get_conn().await?;
        redis::pipe()
            .atomic()
            .incr(generation_key, 1)
            .ignore()
            .del(key)
            .ignore()
            .query_async::<()>(&mut *conn)
            .await
            .map_err(|e| RosterError::Cache(format!("Failed to invalidate '{}': {}", key, e)))?;

        debug!("Invalidated key '{}'", key);
        Ok(())
    }

    async fn ping(&self) -> RosterResult<()> {
        if !self.is_enabled() {
            return Ok(());
        }

        let mut conn = self.get_conn().await?;
        redis::cmd("PING")
            .query_async::<String>(&mut *conn)
            .await
            .map_err(|e| RosterError::Cache(format!("PING failed: {}", e)))?;
        Ok(())
    }
}

#[async_trait]
impl HealthCheck for RedisCacheService {
    fn name(&self) -> &str {
        "cache"
    }

    async fn check(&self) -> HealthStatus {
        if !self.is_enabled() {
            return HealthStatus::Degraded("cache disabled".to_string());
        }
        match self.ping().await {
            Ok(()) => HealthStatus::Healthy,
            Err(e) => HealthStatus::Unhealthy(e.to_string()),
        }
    }
}

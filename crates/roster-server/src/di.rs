//! Dependency wiring.
//!
//! Every long-lived handle is built once here and handed to the HTTP layer as
//! a trait object.

use roster_config::AppConfig;
use roster_core::{HealthCheck, RosterResult};
use roster_repository::{create_pool, DatabasePool, PgUserRepository, UserRepository};
use roster_rest::AppState;
use roster_service::{create_redis_pool, CacheInterface, RedisCacheService, UserService, UserServiceImpl};
use std::sync::Arc;
use tracing::{info, warn};

/// Application module holding the shared handles.
pub struct AppModule {
    database_pool: Arc<DatabasePool>,
    cache: Arc<RedisCacheService>,
    user_service: Arc<dyn UserService>,
}

impl AppModule {
    /// Connects to the store and the cache, then wires the service.
    ///
    /// A cache that is enabled but does not answer `PING` fails the build with
    /// a cache error.
    pub async fn build(config: &AppConfig) -> RosterResult<Self> {
        let database_pool = create_pool(&config.database).await?;

        let cache = if config.redis.enabled {
            RedisCacheService::new(create_redis_pool(&config.redis).await?)
        } else {
            warn!("Redis disabled, every list request will hit the store");
            RedisCacheService::disabled()
        };

        Ok(Self::from_parts(database_pool, cache, config))
    }

    /// Wires the service over already constructed handles.
    pub fn from_parts(
        database_pool: Arc<DatabasePool>,
        cache: RedisCacheService,
        config: &AppConfig,
    ) -> Self {
        let cache = Arc::new(cache);
        let repository: Arc<dyn UserRepository> =
            Arc::new(PgUserRepository::new(database_pool.clone()));
        let cache_handle: Arc<dyn CacheInterface> = cache.clone();

        let user_service = UserServiceImpl::new(repository, cache_handle)
            .with_cache_config(config.cache.clone())
            .with_import_config(config.import.clone());

        info!(
            cache_key = %config.cache.key,
            invalidate_on_write = config.cache.invalidate_on_write,
            atomic_import = config.import.atomic,
            "User service wired"
        );

        Self {
            database_pool,
            cache,
            user_service: Arc::new(user_service),
        }
    }

    /// Returns the user service.
    pub fn user_service(&self) -> Arc<dyn UserService> {
        self.user_service.clone()
    }

    /// Returns the database pool.
    pub fn database_pool(&self) -> Arc<DatabasePool> {
        self.database_pool.clone()
    }

    /// Returns the cache handle.
    pub fn cache(&self) -> Arc<dyn CacheInterface> {
        self.cache.clone()
    }

    /// Builds the HTTP state, registering the store and the cache for readiness.
    pub fn app_state(&self) -> AppState {
        let database: Arc<dyn HealthCheck> = self.database_pool.clone();
        let cache: Arc<dyn HealthCheck> = self.cache.clone();

        AppState::new(self.user_service())
            .with_health_check(database)
            .with_health_check(cache)
    }
}

impl std::fmt::Debug for AppModule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppModule")
            .field("database_pool", &self.database_pool)
            .field("cache_enabled", &self.cache.is_enabled())
            .finish_non_exhaustive()
    }
}

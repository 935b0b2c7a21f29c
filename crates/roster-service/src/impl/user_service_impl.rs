//! User service implementation.

use crate::cache::CacheInterface;
use crate::user_service::{ListSource, UserList, UserService};
use async_trait::async_trait;
use roster_config::{CacheConfig, ImportConfig};
use roster_core::{NewUser, RosterError, RosterResult, User, UserId};
use roster_repository::UserRepository;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// How a freshly read listing may be written back to the cache.
#[derive(Debug, Clone, Copy)]
enum SnapshotGuard {
    /// Writes never invalidate, so the snapshot is stored as-is.
    Unguarded,
    /// Store only if no write bumped the generation since it was sampled.
    Generation(u64),
    /// The generation could not be read; skip caching.
    Unknown,
}

/// User service backed by a repository and the collection cache.
pub struct UserServiceImpl {
    repository: Arc<dyn UserRepository>,
    cache: Arc<dyn CacheInterface>,
    cache_config: CacheConfig,
    import_config: ImportConfig,
}

impl UserServiceImpl {
    /// Creates a new user service with default cache and import policies.
    pub fn new(repository: Arc<dyn UserRepository>, cache: Arc<dyn CacheInterface>) -> Self {
        Self {
            repository,
            cache,
            cache_config: CacheConfig::default(),
            import_config: ImportConfig::default(),
        }
    }

    /// Sets the cache policy.
    #[must_use]
    pub fn with_cache_config(mut self, cache_config: CacheConfig) -> Self {
        self.cache_config = cache_config;
        self
    }

    /// Sets the import policy.
    #[must_use]
    pub fn with_import_config(mut self, import_config: ImportConfig) -> Self {
        self.import_config = import_config;
        self
    }

    fn generation_key(&self) -> String {
        format!("{}:generation", self.cache_config.key)
    }

    /// Drops the cached collection after a store write, if configured to.
    ///
    /// A failure only loses freshness, so it is logged and swallowed.
    async fn invalidate(&self) {
        if !self.cache_config.invalidate_on_write {
            return;
        }
        let key = &self.cache_config.key;
        match self.cache.invalidate(key, &self.generation_key()).await {
            Ok(()) => debug!("Invalidated cache key '{}'", key),
            Err(e) => warn!("Failed to invalidate cache key '{}': {}", key, e),
        }
    }

    /// Samples the write generation before the store is read.
    async fn snapshot_guard(&self) -> SnapshotGuard {
        if !self.cache_config.invalidate_on_write {
            return SnapshotGuard::Unguarded;
        }
        match self.cache.generation(&self.generation_key()).await {
            Ok(generation) => SnapshotGuard::Generation(generation),
            Err(e) => {
                warn!("Cache generation read failed, listing will not be cached: {}", e);
                SnapshotGuard::Unknown
            }
        }
    }

    async fn store_snapshot(&self, body: &str, guard: SnapshotGuard) {
        let key = &self.cache_config.key;
        let ttl = self.cache_config.ttl();

        let result = match guard {
            SnapshotGuard::Unguarded => self.cache.set_raw(key, body, ttl).await.map(|()| true),
            SnapshotGuard::Generation(generation) => {
                self.cache
                    .set_raw_if_generation(key, body, ttl, &self.generation_key(), generation)
                    .await
            }
            SnapshotGuard::Unknown => return,
        };

        match result {
            Ok(true) => {}
            Ok(false) => debug!("User list changed while it was read, not caching '{}'", key),
            Err(e) => warn!("Failed to cache user list under '{}': {}", key, e),
        }
    }

    async fn import_sequential(&self, users: Vec<NewUser>) -> RosterResult<Vec<User>> {
        let mut imported = Vec::with_capacity(users.len());

        for user in users {
            match self.repository.insert(&user).await {
                Ok(id) => imported.push(user.with_id(id)),
                Err(e) => {
                    let committed = imported.len();
                    warn!("Import stopped after {} users: {}", committed, e);
                    if committed > 0 {
                        self.invalidate().await;
                    }
                    return Err(RosterError::import_aborted(committed, e));
                }
            }
        }

        Ok(imported)
    }

    async fn import_atomic(&self, users: Vec<NewUser>) -> RosterResult<Vec<User>> {
        let ids = self.repository.insert_batch_atomic(&users).await?;
        Ok(users
            .into_iter()
            .zip(ids)
            .map(|(user, id)| user.with_id(id))
            .collect())
    }
}

impl std::fmt::Debug for UserServiceImpl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserServiceImpl")
            .field("cache_config", &self.cache_config)
            .field("import_config", &self.import_config)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl UserService for UserServiceImpl {
    async fn list_users(&self) -> RosterResult<UserList> {
        let key = &self.cache_config.key;

        match self.cache.get_raw(key).await {
            Ok(Some(body)) => {
                debug!("Serving user list from cache key '{}'", key);
                return Ok(UserList {
                    body,
                    source: ListSource::Cache,
                });
            }
            Ok(None) => debug!("User list not cached, querying store"),
            Err(e) => warn!("Cache read for '{}' failed, querying store: {}", key, e),
        }

        let guard = self.snapshot_guard().await;
        let users = self.repository.list_all().await?;
        let body = serde_json::to_string(&users)?;
        self.store_snapshot(&body, guard).await;

        Ok(UserList {
            body,
            source: ListSource::Store,
        })
    }

    async fn get_user(&self, id: UserId) -> RosterResult<User> {
        debug!("Getting user: {}", id);

        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| RosterError::not_found("User", id))
    }

    async fn create_user(&self, user: NewUser) -> RosterResult<User> {
        debug!("Creating user: {} {}", user.name, user.surname);

        let id = self.repository.insert(&user).await?;
        self.invalidate().await;

        info!("User created: {}", id);
        Ok(user.with_id(id))
    }

    async fn update_user(&self, id: UserId, user: NewUser) -> RosterResult<User> {
        debug!("Updating user: {}", id);

        let affected = self.repository.update(id, &user).await?;
        if affected == 0 {
            debug!("Update matched no user with id {}", id);
        } else {
            self.invalidate().await;
            info!("User updated: {}", id);
        }

        Ok(user.with_id(id))
    }

    async fn delete_user(&self, id: UserId) -> RosterResult<()> {
        debug!("Deleting user: {}", id);

        let affected = self.repository.delete(id).await?;
        if affected == 0 {
            debug!("Delete matched no user with id {}", id);
        } else {
            self.invalidate().await;
            info!("User deleted: {}", id);
        }

        Ok(())
    }

    async fn import_users(&self, users: Vec<NewUser>) -> RosterResult<Vec<User>> {
        if users.is_empty() {
            return Ok(Vec::new());
        }

        let count = users.len();
        debug!("Importing {} users (atomic: {})", count, self.import_config.atomic);

        let imported = if self.import_config.atomic {
            self.import_atomic(users).await?
        } else {
            self.import_sequential(users).await?
        };

        self.invalidate().await;
        info!("Imported {} users", count);
        Ok(imported)
    }
}

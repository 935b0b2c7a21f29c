//! User service trait definition.

use async_trait::async_trait;
use roster_core::{NewUser, RosterResult, User, UserId};

/// Where a listing was served from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListSource {
    /// The cached snapshot, returned verbatim.
    Cache,
    /// A fresh store query.
    Store,
}

/// Serialized user collection.
///
/// `body` is a JSON array of users. On a cache hit it is exactly the stored
/// payload, never re-encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserList {
    pub body: String,
    pub source: ListSource,
}

impl UserList {
    /// Returns true if the body came from the cache.
    #[must_use]
    pub fn is_cache_hit(&self) -> bool {
        self.source == ListSource::Cache
    }
}

/// User service trait.
#[cfg_attr(any(test, feature = "test-support"), mockall::automock)]
#[async_trait]
pub trait UserService: Send + Sync {
    /// Lists all users, reading through the collection cache.
    async fn list_users(&self) -> RosterResult<UserList>;

    /// Gets a user by ID.
    async fn get_user(&self, id: UserId) -> RosterResult<User>;

    /// Creates a user and returns it with its assigned ID.
    async fn create_user(&self, user: NewUser) -> RosterResult<User>;

    /// Overwrites a user's fields and echoes them back under `id`.
    ///
    /// An unknown `id` is not an error.
    async fn update_user(&self, id: UserId, user: NewUser) -> RosterResult<User>;

    /// Deletes a user. An unknown `id` is not an error.
    async fn delete_user(&self, id: UserId) -> RosterResult<()>;

    /// Inserts a batch of users and returns them with their assigned IDs.
    async fn import_users(&self, users: Vec<NewUser>) -> RosterResult<Vec<User>>;
}

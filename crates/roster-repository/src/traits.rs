//! Repository trait definitions.

use roster_core::{NewUser, RosterResult, User, UserId};
use async_trait::async_trait;

/// User repository trait.
///
/// Update and delete report the number of affected rows; an unknown id is
/// `Ok(0)`, never an error.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Returns every row in storage order.
    async fn list_all(&self) -> RosterResult<Vec<User>>;

    /// Inserts a user and returns the assigned id.
    async fn insert(&self, user: &NewUser) -> RosterResult<UserId>;

    /// Finds a user by ID.
    async fn find_by_id(&self, id: UserId) -> RosterResult<Option<User>>;

    /// Overwrites name, surname, floor, status and dob. `date_added` is kept.
    async fn update(&self, id: UserId, user: &NewUser) -> RosterResult<u64>;

    /// Deletes a user by ID.
    async fn delete(&self, id: UserId) -> RosterResult<u64>;

    /// Inserts all users in one transaction and returns their ids in input
    /// order. Nothing is committed if any insert fails.
    async fn insert_batch_atomic(&self, users: &[NewUser]) -> RosterResult<Vec<UserId>>;
}

//! In-memory user repository for tests.

use crate::traits::UserRepository;
use async_trait::async_trait;
use roster_core::{NewUser, RosterError, RosterResult, User, UserId};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::Mutex;

#[derive(Debug, Default)]
struct Table {
    rows: BTreeMap<UserId, User>,
    next_id: i64,
}

impl Table {
    fn push(&mut self, user: &NewUser) -> UserId {
        self.next_id += 1;
        let id = UserId::new(self.next_id);
        self.rows.insert(id, user.clone().with_id(id));
        id
    }
}

/// In-memory repository with failure injection.
///
/// Ids are assigned from 1 upward and rows list in id order.
#[derive(Debug, Default)]
pub struct MemoryUserRepository {
    table: Mutex<Table>,
    fail_on_name: Option<String>,
    unavailable: AtomicBool,
    insert_attempts: AtomicUsize,
}

impl MemoryUserRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a repository pre-populated with users, keeping their ids.
    #[must_use]
    pub fn with_users(users: Vec<User>) -> Self {
        let next_id = users.iter().map(|u| u.id.into_inner()).max().unwrap_or(0);
        let rows = users.into_iter().map(|u| (u.id, u)).collect();
        Self {
            table: Mutex::new(Table { rows, next_id }),
            ..Self::default()
        }
    }

    /// Makes every insert of a user with this name fail with a conflict.
    #[must_use]
    pub fn fail_on_name(mut self, name: impl Into<String>) -> Self {
        self.fail_on_name = Some(name.into());
        self
    }

    /// Makes every operation fail with a database error while set.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of single-row inserts attempted, successful or not.
    pub fn insert_attempts(&self) -> usize {
        self.insert_attempts.load(Ordering::SeqCst)
    }

    /// Returns all rows in id order.
    pub async fn snapshot(&self) -> Vec<User> {
        self.table.lock().await.rows.values().cloned().collect()
    }

    fn check_available(&self) -> RosterResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(RosterError::Database("connection refused".to_string()));
        }
        Ok(())
    }

    fn check_insertable(&self, user: &NewUser) -> RosterResult<()> {
        match &self.fail_on_name {
            Some(name) if *name == user.name => Err(RosterError::conflict(format!(
                "insert of '{}' violates a constraint",
                user.name
            ))),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn list_all(&self) -> RosterResult<Vec<User>> {
        self.check_available()?;
        Ok(self.snapshot().await)
    }

    async fn insert(&self, user: &NewUser) -> RosterResult<UserId> {
        self.insert_attempts.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;
        self.check_insertable(user)?;
        Ok(self.table.lock().await.push(user))
    }

    async fn find_by_id(&self, id: UserId) -> RosterResult<Option<User>> {
        self.check_available()?;
        Ok(self.table.lock().await.rows.get(&id).cloned())
    }

    async fn update(&self, id: UserId, user: &NewUser) -> RosterResult<u64> {
        self.check_available()?;
        let mut table = self.table.lock().await;
        match table.rows.get_mut(&id) {
            Some(row) => {
                row.name.clone_from(&user.name);
                row.surname.clone_from(&user.surname);
                row.floor = user.floor;
                row.status.clone_from(&user.status);
                row.dob = user.dob;
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete(&self, id: UserId) -> RosterResult<u64> {
        self.check_available()?;
        Ok(u64::from(self.table.lock().await.rows.remove(&id).is_some()))
    }

    async fn insert_batch_atomic(&self, users: &[NewUser]) -> RosterResult<Vec<UserId>> {
        self.check_available()?;
        for user in users {
            self.check_insertable(user)?;
        }

        let mut table = self.table.lock().await;
        Ok(users.iter().map(|user| table.push(user)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn new_user(name: &str) -> NewUser {
        NewUser {
            name: name.to_string(),
            surname: "Lee".to_string(),
            floor: 3,
            status: "active".to_string(),
            dob: Utc.with_ymd_and_hms(1990, 1, 1, 0, 0, 0).unwrap(),
            date_added: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_insert_assigns_sequential_ids() {
        let repo = MemoryUserRepository::new();

        let first = repo.insert(&new_user("Ann")).await.unwrap();
        let second = repo.insert(&new_user("Bo")).await.unwrap();

        assert_eq!(first, UserId(1));
        assert_eq!(second, UserId(2));
        assert_eq!(repo.list_all().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_update_keeps_date_added() {
        let repo = MemoryUserRepository::new();
        let id = repo.insert(&new_user("Ann")).await.unwrap();

        let mut changed = new_user("Anna");
        changed.date_added = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(repo.update(id, &changed).await.unwrap(), 1);

        let stored = repo.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(stored.name, "Anna");
        assert_eq!(stored.date_added, new_user("Ann").date_added);
    }

    #[tokio::test]
    async fn test_unknown_id_affects_no_rows() {
        let repo = MemoryUserRepository::new();
        assert_eq!(repo.update(UserId(9), &new_user("Ann")).await.unwrap(), 0);
        assert_eq!(repo.delete(UserId(9)).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_atomic_batch_commits_nothing_on_failure() {
        let repo = MemoryUserRepository::new().fail_on_name("Bad");

        let batch = vec![new_user("Ann"), new_user("Bad"), new_user("Cy")];
        let err = repo.insert_batch_atomic(&batch).await.unwrap_err();

        assert!(matches!(err, RosterError::Conflict(_)));
        assert!(repo.snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn test_unavailable_store() {
        let repo = MemoryUserRepository::new();
        repo.set_unavailable(true);

        let err = repo.list_all().await.unwrap_err();
        assert_eq!(err.status_code(), 500);

        repo.set_unavailable(false);
        assert!(repo.list_all().await.is_ok());
    }
}

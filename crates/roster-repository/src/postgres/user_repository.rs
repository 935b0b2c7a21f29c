//! PostgreSQL user repository implementation.

use crate::{traits::UserRepository, DatabasePool};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use roster_core::{NewUser, RosterResult, User, UserId};
use sqlx::postgres::PgArguments;
use sqlx::query::QueryScalar;
use sqlx::{FromRow, Postgres};
use std::sync::Arc;
use tracing::{debug, info};

const SELECT_ALL: &str = "SELECT id, name, surname, floor, status, dob, date_added FROM users";

const SELECT_BY_ID: &str =
    "SELECT id, name, surname, floor, status, dob, date_added FROM users WHERE id = $1";

const INSERT_USER: &str = r#"
    INSERT INTO users (name, surname, floor, status, dob, date_added)
    VALUES ($1, $2, $3, $4, $5, $6)
    RETURNING id
"#;

/// PostgreSQL user repository implementation.
#[derive(Clone)]
pub struct PgUserRepository {
    pool: Arc<DatabasePool>,
}

impl PgUserRepository {
    /// Creates a new PostgreSQL user repository.
    #[must_use]
    pub fn new(pool: Arc<DatabasePool>) -> Self {
        Self { pool }
    }
}

impl std::fmt::Debug for PgUserRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgUserRepository").finish_non_exhaustive()
    }
}

/// Database row representation of a user.
#[derive(Debug, FromRow)]
struct UserRow {
    id: i64,
    name: String,
    surname: String,
    floor: i32,
    status: String,
    dob: DateTime<Utc>,
    date_added: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: UserId::new(row.id),
            name: row.name,
            surname: row.surname,
            floor: row.floor,
            status: row.status,
            dob: row.dob,
            date_added: row.date_added,
        }
    }
}

type InsertQuery<'q> = QueryScalar<'q, Postgres, i64, PgArguments>;

fn insert_query(user: &NewUser) -> InsertQuery<'_> {
    sqlx::query_scalar(INSERT_USER)
        .bind(&user.name)
        .bind(&user.surname)
        .bind(user.floor)
        .bind(&user.status)
        .bind(user.dob)
        .bind(user.date_added)
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn list_all(&self) -> RosterResult<Vec<User>> {
        debug!("Listing all users");

        let rows = sqlx::query_as::<_, UserRow>(SELECT_ALL)
            .fetch_all(self.pool.inner())
            .await?;

        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn insert(&self, user: &NewUser) -> RosterResult<UserId> {
        debug!("Inserting user: {} {}", user.name, user.surname);

        let id = insert_query(user).fetch_one(self.pool.inner()).await?;

        info!("Inserted user with id {}", id);
        Ok(UserId::new(id))
    }

    async fn find_by_id(&self, id: UserId) -> RosterResult<Option<User>> {
        debug!("Finding user by id: {}", id);

        let row = sqlx::query_as::<_, UserRow>(SELECT_BY_ID)
            .bind(id.into_inner())
            .fetch_optional(self.pool.inner())
            .await?;

        Ok(row.map(User::from))
    }

    async fn update(&self, id: UserId, user: &NewUser) -> RosterResult<u64> {
        debug!("Updating user: {}", id);

        let result = sqlx::query(
            r#"
            UPDATE users
            SET name = $2, surname = $3, floor = $4, status = $5, dob = $6
            WHERE id = $1
            "#,
        )
        .bind(id.into_inner())
        .bind(&user.name)
        .bind(&user.surname)
        .bind(user.floor)
        .bind(&user.status)
        .bind(user.dob)
        .execute(self.pool.inner())
        .await?;

        Ok(result.rows_affected())
    }

    async fn delete(&self, id: UserId) -> RosterResult<u64> {
        debug!("Deleting user: {}", id);

        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id.into_inner())
            .execute(self.pool.inner())
            .await?;

        Ok(result.rows_affected())
    }

    async fn insert_batch_atomic(&self, users: &[NewUser]) -> RosterResult<Vec<UserId>> {
        debug!("Inserting {} users in one transaction", users.len());

        let mut tx = self.pool.begin().await?;
        let mut ids = Vec::with_capacity(users.len());

        for user in users {
            let id = insert_query(user).fetch_one(&mut *tx).await?;
            ids.push(UserId::new(id));
        }

        tx.commit().await?;

        info!("Committed batch of {} users", ids.len());
        Ok(ids)
    }
}

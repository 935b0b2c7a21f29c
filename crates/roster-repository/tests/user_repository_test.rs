//! Integration tests for PgUserRepository.
//!
//! These tests run against a real PostgreSQL database using testcontainers.
//! Requires Docker to be available on the system.

mod common;

use chrono::{TimeZone, Utc};
use roster_core::{HealthCheck, NewUser, RosterError, UserId};
use roster_repository::{PgUserRepository, UserRepository};
use common::TestDatabase;

fn new_user(name: &str, floor: i32) -> NewUser {
    NewUser {
        name: name.to_string(),
        surname: "Lee".to_string(),
        floor,
        status: "active".to_string(),
        dob: Utc.with_ymd_and_hms(1990, 1, 1, 0, 0, 0).unwrap(),
        date_added: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
    }
}

#[tokio::test]
async fn test_insert_and_find_by_id() {
    let db = TestDatabase::new().await;
    let repo = PgUserRepository::new(db.pool());

    let draft = new_user("Ann", 3);
    let id = repo.insert(&draft).await.expect("Failed to insert user");

    let found = repo
        .find_by_id(id)
        .await
        .expect("Query failed")
        .expect("User not found");

    assert_eq!(found, draft.with_id(id));
}

#[tokio::test]
async fn test_find_by_id_not_found() {
    let db = TestDatabase::new().await;
    let repo = PgUserRepository::new(db.pool());

    let result = repo.find_by_id(UserId(4242)).await.expect("Query failed");
    assert!(result.is_none());
}

#[tokio::test]
async fn test_list_all() {
    let db = TestDatabase::new().await;
    let repo = PgUserRepository::new(db.pool());

    assert!(repo.list_all().await.expect("Query failed").is_empty());

    repo.insert(&new_user("Ann", 1)).await.expect("Failed to insert");
    repo.insert(&new_user("Bo", 2)).await.expect("Failed to insert");

    let mut names: Vec<String> = repo
        .list_all()
        .await
        .expect("Query failed")
        .into_iter()
        .map(|u| u.name)
        .collect();
    names.sort();
    assert_eq!(names, vec!["Ann", "Bo"]);
}

#[tokio::test]
async fn test_update_overwrites_fields_but_not_date_added() {
    let db = TestDatabase::new().await;
    let repo = PgUserRepository::new(db.pool());

    let id = repo.insert(&new_user("Ann", 3)).await.expect("Failed to insert");

    let mut changed = new_user("Anna", 7);
    changed.status = "away".to_string();
    changed.date_added = Utc.with_ymd_and_hms(2030, 6, 1, 0, 0, 0).unwrap();

    let affected = repo.update(id, &changed).await.expect("Failed to update");
    assert_eq!(affected, 1);

    let stored = repo.find_by_id(id).await.expect("Query failed").expect("User not found");
    assert_eq!(stored.name, "Anna");
    assert_eq!(stored.floor, 7);
    assert_eq!(stored.status, "away");
    assert_eq!(stored.date_added, new_user("Ann", 3).date_added);
}

#[tokio::test]
async fn test_update_and_delete_unknown_id_affect_nothing() {
    let db = TestDatabase::new().await;
    let repo = PgUserRepository::new(db.pool());

    assert_eq!(repo.update(UserId(99), &new_user("Ann", 1)).await.expect("Update failed"), 0);
    assert_eq!(repo.delete(UserId(99)).await.expect("Delete failed"), 0);
}

#[tokio::test]
async fn test_delete() {
    let db = TestDatabase::new().await;
    let repo = PgUserRepository::new(db.pool());

    let id = repo.insert(&new_user("Ann", 3)).await.expect("Failed to insert");
    assert_eq!(repo.delete(id).await.expect("Delete failed"), 1);
    assert!(repo.find_by_id(id).await.expect("Query failed").is_none());
}

#[tokio::test]
async fn test_constraint_violation_maps_to_conflict() {
    let db = TestDatabase::new().await;
    let repo = PgUserRepository::new(db.pool());

    let err = repo.insert(&new_user("Ann", -1)).await.unwrap_err();
    assert!(matches!(err, RosterError::Conflict(_)), "unexpected error: {err:?}");
    assert_eq!(err.status_code(), 409);
}

#[tokio::test]
async fn test_atomic_batch_returns_ids_in_order() {
    let db = TestDatabase::new().await;
    let repo = PgUserRepository::new(db.pool());

    let batch = vec![new_user("Ann", 1), new_user("Bo", 2), new_user("Cy", 3)];
    let ids = repo.insert_batch_atomic(&batch).await.expect("Batch failed");

    assert_eq!(ids.len(), 3);
    for (id, draft) in ids.iter().zip(&batch) {
        let stored = repo.find_by_id(*id).await.expect("Query failed").expect("User not found");
        assert_eq!(stored.name, draft.name);
    }
}

#[tokio::test]
async fn test_atomic_batch_rolls_back_on_failure() {
    let db = TestDatabase::new().await;
    let repo = PgUserRepository::new(db.pool());

    let batch = vec![new_user("Ann", 1), new_user("Bad", -5), new_user("Cy", 3)];
    let err = repo.insert_batch_atomic(&batch).await.unwrap_err();

    assert!(matches!(err, RosterError::Conflict(_)));
    assert!(repo.list_all().await.expect("Query failed").is_empty());
}

#[tokio::test]
async fn test_pool_health_check() {
    let db = TestDatabase::new().await;
    let pool = db.pool();

    assert!(pool.health_check().await.is_ok());
    assert!(pool.check().await.is_healthy());
    assert_eq!(pool.name(), "database");
}

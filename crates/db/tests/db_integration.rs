//! Database integration tests.
//!
//! These tests require a running `PostgreSQL` instance.
//! Run with: `cargo test --test db_integration -- --ignored`
//!
//! Environment variables:
//!   `TEST_DB_HOST` (default: localhost)
//!   `TEST_DB_PORT` (default: 5433)
//!   `TEST_DB_USER` (default: `warden_test`)
//!   `TEST_DB_PASSWORD` (default: `warden_test`)
//!   `TEST_DB_NAME` (default: `warden_test`)

#![allow(clippy::unwrap_used)]

use chrono::Utc;
use sea_orm::Set;
use warden_db::{
    entities::punishment::{self, PunishmentKind},
    repositories::PunishmentRepository,
    test_utils::{TestDatabase, TestDbConfig},
};

fn warn_model(name: &str) -> punishment::ActiveModel {
    punishment::ActiveModel {
        subject_account_id: Set(Some("acc1".to_string())),
        subject_display_name: Set(name.to_string()),
        subject_address: Set(None),
        kind: Set(PunishmentKind::Warn),
        reason: Set("spam".to_string()),
        issued_by: Set("Console".to_string()),
        created_at: Set(Utc::now().fixed_offset()),
        expires_at: Set(None),
        active: Set(true),
        ..Default::default()
    }
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_database_connection() {
    let config = TestDbConfig::default();
    let result = TestDatabase::with_config(config).await;
    assert!(result.is_ok(), "Failed to connect: {:?}", result.err());
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_insert_assigns_monotonic_ids() {
    let db = TestDatabase::create_unique().await.unwrap();
    warden_db::migrate(db.connection()).await.unwrap();

    let repo = PunishmentRepository::new(db.conn.clone());

    let first = repo.insert(warn_model("Steve")).await.unwrap();
    let second = repo.insert(warn_model("Steve")).await.unwrap();
    assert!(second.id > first.id);

    db.drop_database().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_name_lookup_is_case_insensitive() {
    let db = TestDatabase::create_unique().await.unwrap();
    warden_db::migrate(db.connection()).await.unwrap();

    let repo = PunishmentRepository::new(db.conn.clone());
    repo.insert(warn_model("Steve")).await.unwrap();

    let warnings = repo.find_warnings(None, Some("sTeVe"), 100).await.unwrap();
    assert_eq!(warnings.len(), 1);

    let count = repo.count_warnings(None, Some("STEVE")).await.unwrap();
    assert_eq!(count, 1);

    db.drop_database().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_expired_warnings_leave_the_count() {
    let db = TestDatabase::create_unique().await.unwrap();
    warden_db::migrate(db.connection()).await.unwrap();

    let repo = PunishmentRepository::new(db.conn.clone());
    repo.insert(warn_model("Steve")).await.unwrap();

    let mut expired = warn_model("Steve");
    expired.expires_at = Set(Some(
        (Utc::now() - chrono::Duration::hours(1)).fixed_offset(),
    ));
    repo.insert(expired).await.unwrap();

    assert_eq!(repo.count_warnings(Some("acc1"), None).await.unwrap(), 1);
    let listed = repo.find_warnings(Some("acc1"), None, 100).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert!(listed[0].expires_at.is_none());

    db.drop_database().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_clear_warnings_removes_rows() {
    let db = TestDatabase::create_unique().await.unwrap();
    warden_db::migrate(db.connection()).await.unwrap();

    let repo = PunishmentRepository::new(db.conn.clone());
    for _ in 0..3 {
        repo.insert(warn_model("Steve")).await.unwrap();
    }

    let removed = repo.delete_warnings(Some("acc1"), None).await.unwrap();
    assert_eq!(removed, 3);

    let remaining = repo.find_warnings(Some("acc1"), None, 100).await.unwrap();
    assert!(remaining.is_empty());

    db.drop_database().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_prefix_search_and_distinct_names() {
    let db = TestDatabase::create_unique().await.unwrap();
    warden_db::migrate(db.connection()).await.unwrap();

    let repo = PunishmentRepository::new(db.conn.clone());
    repo.insert(warn_model("Steve")).await.unwrap();
    repo.insert(warn_model("Steven")).await.unwrap();
    repo.insert(warn_model("Alex")).await.unwrap();

    let names = repo.search_names_by_prefix("ste", 10).await.unwrap();
    assert_eq!(names, vec!["Steve".to_string(), "Steven".to_string()]);

    let all = repo
        .distinct_subject_names(Some(PunishmentKind::Warn), Some(true))
        .await
        .unwrap();
    assert_eq!(all.len(), 3);

    db.drop_database().await.unwrap();
}

#[test]
fn test_config_from_env() {
    let config = TestDbConfig::default();
    assert!(!config.host.is_empty());
    assert!(config.port > 0);
    assert!(!config.username.is_empty());
    assert!(!config.database.is_empty());
}

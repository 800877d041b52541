// ABOUTME: Common test utilities for insights integration tests
// ABOUTME: In-memory database setup and direct-row seed helpers

use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

/// In-memory database with migrations applied. A single connection keeps
/// every query on the same memory database.
pub async fn setup_test_db() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create database pool");

    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&pool)
        .await
        .unwrap();

    sqlx::migrate!("../storage/migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    pool
}

#[allow(dead_code)]
pub async fn create_user(pool: &SqlitePool, user_id: &str) -> String {
    sqlx::query("INSERT INTO users (id, email, display_name) VALUES (?, ?, ?)")
        .bind(user_id)
        .bind(format!("{}@example.com", user_id))
        .bind("Test User")
        .execute(pool)
        .await
        .expect("Failed to create test user");
    user_id.to_string()
}

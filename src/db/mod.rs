//! Database module for SQLite persistence.
//!
//! SQLite is the source of truth for accounts, commands and bookmarks.

mod repository;
mod store;

pub use repository::*;
pub use store::*;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Initialize the database connection pool and run migrations.
///
/// `acquire_timeout` bounds how long a request waits for a pooled connection;
/// exceeding it surfaces as a transient store failure.
pub async fn init_database(
    db_path: &Path,
    acquire_timeout: Duration,
) -> Result<SqlitePool, sqlx::Error> {
    // Ensure the parent directory exists
    if let Some(parent) = db_path.parent() {
        tokio::fs::create_dir_all(parent).await.ok();
    }

    let db_url = format!("sqlite:{}?mode=rwc", db_path.display());

    let options = SqliteConnectOptions::from_str(&db_url)?
        .create_if_missing(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
        .busy_timeout(Duration::from_secs(30));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .acquire_timeout(acquire_timeout)
        .connect_with(options)
        .await?;

    run_migrations(&pool).await?;

    Ok(pool)
}

/// Run database migrations.
async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS accounts (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            api_key TEXT NOT NULL UNIQUE,
            created_at TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    // One row per command keeps writes scoped to a single key.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS commands (
            api_key TEXT NOT NULL,
            cmd TEXT NOT NULL,
            url TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            PRIMARY KEY (api_key, cmd)
        );
        "#,
    )
    .execute(pool)
    .await?;

    // `seq` preserves insertion order; (api_key, name, path) may repeat.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS bookmarks (
            seq INTEGER PRIMARY KEY AUTOINCREMENT,
            id TEXT NOT NULL UNIQUE,
            api_key TEXT NOT NULL,
            name TEXT NOT NULL,
            path TEXT NOT NULL,
            url TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_bookmarks_api_key_path ON bookmarks(api_key, path);
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

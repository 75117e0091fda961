//! # cp-db-sqlite
//!
//! SQLite implementation of the Citypress persistence ports. All multi-row
//! invariants (radar singleton, association replace, guarded delete) are
//! enforced here as transactions, because multiple server processes may
//! share one database file.

use std::str::FromStr;

use cp_core::error::AppError;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use uuid::Uuid;

mod category;
mod story;
mod user;

/// One pool, three ports: `StoryRepo`, `CategoryRepo`, `UserRepo`.
pub struct SqliteStore {
    pool: SqlitePool,
}

// SQLite applies PRAGMAs per connection; in-memory databases additionally
// vanish with their connection, so the pool is pinned to one there.
impl SqliteStore {
    pub async fn connect(url: &str) -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);
        let max_connections = if url.contains(":memory:") { 1 } else { 8 };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        apply_schema(&pool).await?;
        Ok(Self { pool })
    }

    pub async fn in_memory() -> anyhow::Result<Self> {
        Self::connect("sqlite::memory:").await
    }
}

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS users (
        id          TEXT PRIMARY KEY,
        email       TEXT NOT NULL,
        first_name  TEXT NOT NULL DEFAULT '',
        last_name   TEXT NOT NULL DEFAULT ''
    )",
    "CREATE TABLE IF NOT EXISTS stories (
        id             BLOB PRIMARY KEY,
        title          TEXT NOT NULL,
        content        TEXT NOT NULL,
        summary        TEXT NOT NULL,
        borough        TEXT NOT NULL,
        thumbnail      TEXT NOT NULL,
        is_published   INTEGER NOT NULL DEFAULT 1,
        is_radar       INTEGER NOT NULL DEFAULT 0,
        is_recommended INTEGER NOT NULL DEFAULT 0,
        is_trashed     INTEGER NOT NULL DEFAULT 0,
        author_id      TEXT REFERENCES users(id),
        created_at     TEXT NOT NULL,
        updated_at     TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS categories (
        id          BLOB PRIMARY KEY,
        name        TEXT NOT NULL,
        description TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS story_categories (
        story_id    BLOB NOT NULL REFERENCES stories(id),
        category_id BLOB NOT NULL REFERENCES categories(id),
        PRIMARY KEY (story_id, category_id)
    )",
    "CREATE TABLE IF NOT EXISTS saves (
        story_id BLOB NOT NULL REFERENCES stories(id),
        user_id  TEXT NOT NULL,
        PRIMARY KEY (story_id, user_id)
    )",
    "CREATE TABLE IF NOT EXISTS subscribers (
        id         BLOB PRIMARY KEY,
        email      TEXT NOT NULL UNIQUE,
        phone      TEXT,
        created_at TEXT NOT NULL
    )",
];

async fn apply_schema(pool: &SqlitePool) -> anyhow::Result<()> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}

// Helpers for UUID conversion
pub(crate) fn uuid_to_blob(id: Uuid) -> Vec<u8> {
    id.as_bytes().to_vec()
}

pub(crate) fn blob_to_uuid(blob: &[u8]) -> Uuid {
    Uuid::from_slice(blob).unwrap_or_default()
}

/// Folds driver errors into the domain taxonomy: lock contention becomes a
/// retryable `StoreTransaction`, constraint hits become validation, the rest
/// stays an opaque internal failure.
pub(crate) fn map_db_err(e: sqlx::Error) -> AppError {
    log::debug!("sqlite error: {e}");
    if let sqlx::Error::Database(db) = &e {
        match db.code().as_deref() {
            // SQLITE_BUSY, SQLITE_LOCKED and their extended codes
            Some("5") | Some("6") | Some("261") | Some("262") => {
                return AppError::StoreTransaction(db.to_string());
            }
            // SQLITE_CONSTRAINT_PRIMARYKEY / _UNIQUE
            Some("1555") | Some("2067") => {
                return AppError::Validation("already exists".to_string());
            }
            _ => {}
        }
    }
    AppError::Internal(e.to_string())
}

#[cfg(test)]
pub(crate) async fn test_store() -> SqliteStore {
    SqliteStore::in_memory().await.expect("in-memory store")
}

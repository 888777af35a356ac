//! Database module for SQLite persistence.
//!
//! SQLite is the source of truth for content, accounts and archived matches.

mod repository;

pub use repository::*;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;

use crate::errors::AppError;
use crate::models::SeedContent;

/// Initialize the database connection pool and run migrations.
pub async fn init_database(db_path: &Path) -> Result<SqlitePool, sqlx::Error> {
    // Ensure the parent directory exists
    if let Some(parent) = db_path.parent() {
        tokio::fs::create_dir_all(parent).await.ok();
    }

    let db_url = format!("sqlite:{}?mode=rwc", db_path.display());

    let options = SqliteConnectOptions::from_str(&db_url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
        .busy_timeout(std::time::Duration::from_secs(30));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    run_migrations(&pool).await?;

    Ok(pool)
}

/// Run database migrations.
async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS memes (
            id INTEGER PRIMARY KEY,
            image_url TEXT NOT NULL,
            title TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS captions (
            id INTEGER PRIMARY KEY,
            text TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    // At most one caption per point value per meme, and no duplicate pairs.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS meme_captions (
            meme_id INTEGER NOT NULL REFERENCES memes(id) ON DELETE CASCADE,
            caption_id INTEGER NOT NULL REFERENCES captions(id) ON DELETE CASCADE,
            points INTEGER NOT NULL CHECK (points IN (1, 2, 3)),
            PRIMARY KEY (meme_id, caption_id),
            UNIQUE (meme_id, points)
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            username TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            points INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS matches (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            rounds TEXT NOT NULL,
            total_points INTEGER NOT NULL,
            created_at TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create indexes for common queries
    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_meme_captions_caption ON meme_captions(caption_id);
        CREATE INDEX IF NOT EXISTS idx_matches_user_created ON matches(user_id, created_at);
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Load a seed document into the content tables.
///
/// Rows that already exist are left untouched, so loading the same file on every
/// startup is harmless.
pub async fn load_seed(pool: &SqlitePool, path: &Path) -> Result<SeedContent, AppError> {
    let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
        AppError::Internal(format!("Failed to read seed file {}: {}", path.display(), e))
    })?;
    let seed: SeedContent = serde_json::from_str(&raw)?;

    let mut tx = pool.begin().await?;

    for meme in &seed.memes {
        sqlx::query("INSERT OR IGNORE INTO memes (id, image_url, title) VALUES (?, ?, ?)")
            .bind(meme.id)
            .bind(&meme.image_url)
            .bind(&meme.title)
            .execute(&mut *tx)
            .await?;
    }

    for caption in &seed.captions {
        sqlx::query("INSERT OR IGNORE INTO captions (id, text) VALUES (?, ?)")
            .bind(caption.id)
            .bind(&caption.text)
            .execute(&mut *tx)
            .await?;
    }

    for assoc in &seed.associations {
        sqlx::query(
            "INSERT OR IGNORE INTO meme_captions (meme_id, caption_id, points) VALUES (?, ?, ?)",
        )
        .bind(assoc.meme_id)
        .bind(assoc.caption_id)
        .bind(assoc.points)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    Ok(seed)
}

//! Database module for durable match persistence.
//!
//! Uses SQLx with SQLite for lightweight, embedded storage of match
//! decisions. Provides async operations for:
//! - Point lookup by cache key
//! - Upsert (insert or overwrite) by cache key
//! - Aggregate counts for reporting
//!
//! # Example
//!
//! ```ignore
//! use spin_match::db::{init_db, get_video_match};
//!
//! let pool = init_db("sqlite:spin_match.db").await?;
//! let row = get_video_match(&pool, "theweekndblindinglights").await?;
//! ```

use crate::model::{MatchStats, VideoMatchRow};
use sqlx::migrate::MigrateDatabase;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

/// Default database filename.
pub const DEFAULT_DB_NAME: &str = "spin_match.db";

/// Build a SQLite database URL from an optional path.
///
/// If no path is provided, uses [`DEFAULT_DB_NAME`] in the current directory.
pub fn db_url(path: Option<&std::path::Path>) -> String {
    match path {
        Some(p) => format!("sqlite:{}", p.display()),
        None => format!("sqlite:{}", DEFAULT_DB_NAME),
    }
}

/// Initialize the database connection pool and run migrations.
///
/// Creates the database file if it doesn't exist, establishes a connection
/// pool with up to 5 connections, and runs all pending migrations.
///
/// # Errors
///
/// Returns an error if:
/// - Database creation fails
/// - Connection cannot be established
/// - Migration fails
pub async fn init_db(db_url: &str) -> Result<SqlitePool, sqlx::Error> {
    if !sqlx::Sqlite::database_exists(db_url).await.unwrap_or(false) {
        sqlx::Sqlite::create_database(db_url).await?;
    }

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(db_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(pool)
}

/// Look up a match decision by cache key.
pub async fn get_video_match(
    pool: &SqlitePool,
    cache_key: &str,
) -> sqlx::Result<Option<VideoMatchRow>> {
    sqlx::query_as::<_, VideoMatchRow>(
        r#"
        SELECT cache_key, found, video_id, title, channel_title, thumbnail_url,
               embed_url, created_at, updated_at
        FROM video_matches
        WHERE cache_key = ?
        "#,
    )
    .bind(cache_key)
    .fetch_optional(pool)
    .await
}

/// Insert or overwrite a match decision.
///
/// Uses SQLite's UPSERT keyed on `cache_key`. `created_at` is kept from the
/// first write; everything else is replaced. Concurrent writers for the same
/// key resolve as last-write-wins.
pub async fn upsert_video_match(pool: &SqlitePool, row: &VideoMatchRow) -> sqlx::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO video_matches (
            cache_key, found, video_id, title, channel_title, thumbnail_url,
            embed_url, created_at, updated_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(cache_key) DO UPDATE SET
            found = excluded.found,
            video_id = excluded.video_id,
            title = excluded.title,
            channel_title = excluded.channel_title,
            thumbnail_url = excluded.thumbnail_url,
            embed_url = excluded.embed_url,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(&row.cache_key)
    .bind(row.found)
    .bind(&row.video_id)
    .bind(&row.title)
    .bind(&row.channel_title)
    .bind(&row.thumbnail_url)
    .bind(&row.embed_url)
    .bind(&row.created_at)
    .bind(&row.updated_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Count cached decisions.
pub async fn match_stats(pool: &SqlitePool) -> sqlx::Result<MatchStats> {
    sqlx::query_as::<_, MatchStats>(
        "SELECT COUNT(*) AS total, COALESCE(SUM(found), 0) AS found FROM video_matches",
    )
    .fetch_one(pool)
    .await
}

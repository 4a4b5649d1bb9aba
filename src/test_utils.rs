//! Test utilities and fixtures for spin-match tests.
//!
//! Common builders for search results plus a throwaway SQLite database.
//!
//! # Example
//!
//! ```ignore
//! use crate::test_utils::{temp_db, search_result};
//!
//! #[tokio::test]
//! async fn test_something() {
//!     let (pool, _dir) = temp_db().await;
//!     let hit = search_result("id", "Artist - Song (Official Video)", "ArtistVEVO");
//! }
//! ```

use sqlx::sqlite::SqlitePool;
use tempfile::TempDir;

use crate::matching::domain::{SearchResult, VideoMatch};

/// Creates a temporary database for testing.
///
/// Keep the returned `TempDir` alive for the duration of the test; the
/// database is deleted when it is dropped.
pub async fn temp_db() -> (SqlitePool, TempDir) {
    let dir = tempfile::tempdir().expect("Failed to create temp directory");
    let db_path = dir.path().join("test.db");
    let db_url = format!("sqlite:{}", db_path.display());

    let pool = crate::db::init_db(&db_url)
        .await
        .expect("Failed to initialize test database");

    (pool, dir)
}

/// A search result with a derived thumbnail.
pub fn search_result(video_id: &str, title: &str, channel_title: &str) -> SearchResult {
    SearchResult {
        video_id: video_id.to_string(),
        title: title.to_string(),
        channel_title: channel_title.to_string(),
        thumbnail_url: Some(format!("https://i.ytimg.com/vi/{video_id}/hqdefault.jpg")),
    }
}

/// Five results unrelated to any track used in tests.
pub fn irrelevant_results() -> Vec<SearchResult> {
    vec![
        search_result("x1", "Cat videos compilation", "CatLover"),
        search_result("x2", "How to bake bread at home", "KitchenTips"),
        search_result("x3", "Top 10 goals of the season", "SportsDaily"),
        search_result("x4", "Relaxing rain sounds 10 hours", "SleepWell"),
        search_result("x5", "Unboxing the new phone", "TechGuy"),
    ]
}

/// A matched video for store tests.
pub fn sample_video(video_id: &str) -> VideoMatch {
    VideoMatch::from_result(search_result(video_id, "Adele - Hello (Official Video)", "AdeleVEVO"))
}

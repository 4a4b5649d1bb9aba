//! Database row models.
//!
//! # Database Schema
//!
//! - `video_matches` - one row per cache key; `found = 0` rows carry no video

use sqlx::FromRow;

/// A row of the `video_matches` table.
#[derive(Debug, Clone, FromRow)]
pub struct VideoMatchRow {
    /// Normalized artist+song key (primary key)
    pub cache_key: String,
    /// Whether a video was found
    pub found: bool,
    pub video_id: Option<String>,
    pub title: Option<String>,
    pub channel_title: Option<String>,
    pub thumbnail_url: Option<String>,
    pub embed_url: Option<String>,
    /// RFC 3339 timestamp of the first resolution
    pub created_at: String,
    /// RFC 3339 timestamp of the latest overwrite
    pub updated_at: String,
}

/// Aggregate counts over the match cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, FromRow)]
pub struct MatchStats {
    pub total: i64,
    pub found: i64,
}

impl MatchStats {
    pub fn not_found(&self) -> i64 {
        self.total - self.found
    }
}

//! Match cache storage.
//!
//! [`MatchStore`] is a point lookup/upsert by cache key with no expiry.
//! Implementations:
//! - [`SqliteMatchStore`] - the durable tier
//! - [`MemoryMatchStore`] - process-local tier
//! - [`TieredStore`] - memory in front of a durable store

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use sqlx::sqlite::SqlitePool;

use crate::db;
use crate::matching::domain::{VideoMatch, embed_url};
use crate::model::{MatchStats, VideoMatchRow};

/// A cached decision for one key. `video` is `None` for a negative result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedMatch {
    pub cache_key: String,
    pub video: Option<VideoMatch>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CachedMatch {
    pub fn found(&self) -> bool {
        self.video.is_some()
    }
}

/// Errors from a cache tier
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Corrupt cache record {key}: {reason}")]
    Corrupt { key: String, reason: String },
}

/// Durable or in-memory match cache.
#[async_trait]
pub trait MatchStore: Send + Sync {
    async fn get(&self, cache_key: &str) -> Result<Option<CachedMatch>, StoreError>;

    /// Insert or overwrite the decision for `cache_key`.
    async fn put(&self, cache_key: &str, video: Option<&VideoMatch>) -> Result<(), StoreError>;
}

// ============================================================================
// SQLite
// ============================================================================

/// Durable tier backed by the `video_matches` table.
#[derive(Clone)]
pub struct SqliteMatchStore {
    pool: SqlitePool,
}

impl SqliteMatchStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Counts for reporting tools.
    pub async fn stats(&self) -> Result<MatchStats, StoreError> {
        Ok(db::match_stats(&self.pool).await?)
    }
}

#[async_trait]
impl MatchStore for SqliteMatchStore {
    async fn get(&self, cache_key: &str) -> Result<Option<CachedMatch>, StoreError> {
        match db::get_video_match(&self.pool, cache_key).await? {
            Some(row) => from_row(row).map(Some),
            None => Ok(None),
        }
    }

    async fn put(&self, cache_key: &str, video: Option<&VideoMatch>) -> Result<(), StoreError> {
        let row = to_row(cache_key, video, Utc::now());
        db::upsert_video_match(&self.pool, &row).await?;
        Ok(())
    }
}

fn to_row(cache_key: &str, video: Option<&VideoMatch>, now: DateTime<Utc>) -> VideoMatchRow {
    let stamp = now.to_rfc3339();
    VideoMatchRow {
        cache_key: cache_key.to_string(),
        found: video.is_some(),
        video_id: video.map(|v| v.video_id.clone()),
        title: video.map(|v| v.title.clone()),
        channel_title: video.map(|v| v.channel_title.clone()),
        thumbnail_url: video.and_then(|v| v.thumbnail_url.clone()),
        embed_url: video.map(|v| v.embed_url.clone()),
        created_at: stamp.clone(),
        updated_at: stamp,
    }
}

fn from_row(row: VideoMatchRow) -> Result<CachedMatch, StoreError> {
    let corrupt = |reason: &str| StoreError::Corrupt {
        key: row.cache_key.clone(),
        reason: reason.to_string(),
    };

    let created_at = parse_timestamp(&row.created_at).ok_or_else(|| corrupt("bad created_at"))?;
    let updated_at = parse_timestamp(&row.updated_at).ok_or_else(|| corrupt("bad updated_at"))?;

    let video = if row.found {
        let video_id = row
            .video_id
            .clone()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| corrupt("found without video id"))?;
        Some(VideoMatch {
            embed_url: row
                .embed_url
                .clone()
                .filter(|u| !u.is_empty())
                .unwrap_or_else(|| embed_url(&video_id)),
            video_id,
            title: row.title.clone().unwrap_or_default(),
            channel_title: row.channel_title.clone().unwrap_or_default(),
            thumbnail_url: row.thumbnail_url.clone(),
        })
    } else {
        None
    };

    Ok(CachedMatch {
        cache_key: row.cache_key,
        video,
        created_at,
        updated_at,
    })
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

// ============================================================================
// In-memory
// ============================================================================

/// Process-local tier. Lost on restart.
#[derive(Default)]
pub struct MemoryMatchStore {
    entries: RwLock<HashMap<String, CachedMatch>>,
}

impl MemoryMatchStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    fn remember(&self, record: CachedMatch) {
        self.entries.write().insert(record.cache_key.clone(), record);
    }
}

#[async_trait]
impl MatchStore for MemoryMatchStore {
    async fn get(&self, cache_key: &str) -> Result<Option<CachedMatch>, StoreError> {
        Ok(self.entries.read().get(cache_key).cloned())
    }

    async fn put(&self, cache_key: &str, video: Option<&VideoMatch>) -> Result<(), StoreError> {
        let now = Utc::now();
        let mut entries = self.entries.write();
        let created_at = entries.get(cache_key).map_or(now, |e| e.created_at);
        entries.insert(
            cache_key.to_string(),
            CachedMatch {
                cache_key: cache_key.to_string(),
                video: video.cloned(),
                created_at,
                updated_at: now,
            },
        );
        Ok(())
    }
}

// ============================================================================
// Tiered
// ============================================================================

/// Memory tier in front of a durable store.
///
/// Reads fall through to the durable store and populate memory on a hit.
/// Writes land in memory even if the durable write fails, so this process
/// won't search the same key again; the durable error is still returned.
pub struct TieredStore {
    memory: MemoryMatchStore,
    durable: Arc<dyn MatchStore>,
}

impl TieredStore {
    pub fn new(durable: Arc<dyn MatchStore>) -> Self {
        Self {
            memory: MemoryMatchStore::new(),
            durable,
        }
    }
}

#[async_trait]
impl MatchStore for TieredStore {
    async fn get(&self, cache_key: &str) -> Result<Option<CachedMatch>, StoreError> {
        if let Some(hit) = self.memory.get(cache_key).await? {
            return Ok(Some(hit));
        }
        let record = self.durable.get(cache_key).await?;
        if let Some(ref record) = record {
            self.memory.remember(record.clone());
        }
        Ok(record)
    }

    async fn put(&self, cache_key: &str, video: Option<&VideoMatch>) -> Result<(), StoreError> {
        self.memory.put(cache_key, video).await?;
        self.durable.put(cache_key, video).await
    }
}

/// Stores for failure-path tests.
#[cfg(test)]
pub mod mocks {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    /// Store whose every operation fails.
    #[derive(Default)]
    pub struct FailingStore {
        pub puts: AtomicUsize,
    }

    impl FailingStore {
        pub fn put_count(&self) -> usize {
            self.puts.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl MatchStore for FailingStore {
        async fn get(&self, cache_key: &str) -> Result<Option<CachedMatch>, StoreError> {
            Err(StoreError::Corrupt {
                key: cache_key.to_string(),
                reason: "store offline".to_string(),
            })
        }

        async fn put(&self, cache_key: &str, _video: Option<&VideoMatch>) -> Result<(), StoreError> {
            self.puts.fetch_add(1, Ordering::SeqCst);
            Err(StoreError::Corrupt {
                key: cache_key.to_string(),
                reason: "store offline".to_string(),
            })
        }
    }
}

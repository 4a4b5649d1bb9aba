//! Cache and rate-limit gateway - the single entry point for match lookups.
//!
//! `resolve(artist, song)`:
//! 1. If the key is cooling down, serve whatever is cached (or a
//!    rate-limited "not found") without searching
//! 2. Serve a cache hit, positive or negative, without searching
//! 3. Record the attempt, then run the [`Matcher`]
//! 4. Cache the outcome, found or not, with no expiry
//!
//! Cache-store failures never fail a resolve: a failed read is a miss and a
//! failed write is logged. Caller misuse, (by default) a missing API
//! credential, and a run where no query reached the API come back as
//! errors, and none of them is cached.

pub mod rate_limit;
pub mod store;

use std::sync::Arc;

use crate::matching::domain::{MatchError, MatchOrigin, MatchResult, VideoMatch};
use crate::matching::normalize::{NormalizedTrack, rate_limit_key};
use crate::matching::orchestrator::{Matcher, Outcome};

pub use rate_limit::{InMemoryRateLimiter, RateLimiter};
pub use store::{CachedMatch, MatchStore, SqliteMatchStore, StoreError, TieredStore};

/// Errors surfaced to callers of [`MatchGateway::resolve`]
#[derive(Debug, Clone, thiserror::Error)]
pub enum ResolveError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Video search is not configured: {0}")]
    Configuration(String),

    #[error("Video search is unavailable: {0}")]
    Unavailable(String),
}

/// Resolves tracks to videos with durable caching and per-key cool-down.
pub struct MatchGateway {
    matcher: Matcher,
    store: Arc<dyn MatchStore>,
    limiter: Arc<dyn RateLimiter>,
    cache_configuration_errors: bool,
}

impl MatchGateway {
    pub fn new(matcher: Matcher, store: Arc<dyn MatchStore>, limiter: Arc<dyn RateLimiter>) -> Self {
        Self {
            matcher,
            store,
            limiter,
            cache_configuration_errors: false,
        }
    }

    /// Persist a configuration failure as a permanent "not found" instead of
    /// returning [`ResolveError::Configuration`].
    pub fn cache_configuration_errors(mut self, enabled: bool) -> Self {
        self.cache_configuration_errors = enabled;
        self
    }

    /// Find the video for a track, searching only when nothing is cached.
    pub async fn resolve(&self, artist: &str, song: &str) -> Result<MatchResult, ResolveError> {
        let artist = artist.trim();
        let song = song.trim();
        if artist.is_empty() || song.is_empty() {
            return Err(ResolveError::InvalidInput(
                "artist and song are required".to_string(),
            ));
        }

        let track = NormalizedTrack::new(artist, song);
        let cache_key = track.cache_key();
        if cache_key.is_empty() {
            return Err(ResolveError::InvalidInput(format!(
                "no searchable characters in {:?} / {:?}",
                artist, song
            )));
        }

        let limit_key = rate_limit_key(artist, song);
        if self.limiter.should_throttle(&limit_key) {
            tracing::debug!("Rate limited: {}", limit_key);
            return Ok(match self.cached(&cache_key).await {
                Some(record) => cached_result(record, MatchOrigin::RateLimitedCache),
                None => MatchResult::NotFound {
                    origin: MatchOrigin::RateLimited,
                },
            });
        }

        if let Some(record) = self.cached(&cache_key).await {
            tracing::debug!("Cache hit for {} (found={})", cache_key, record.found());
            return Ok(cached_result(record, MatchOrigin::Cache));
        }

        // Recorded before searching so a slow or failing search still cools down
        self.limiter.record_attempt(&limit_key);

        let video = match self.matcher.find_match(&track).await {
            Ok(Outcome::Matched {
                video,
                score,
                queries_issued,
            }) => {
                tracing::info!(
                    "Matched {:?} - {:?} to {} (score {}, {} queries)",
                    artist,
                    song,
                    video.video_id,
                    score,
                    queries_issued
                );
                Some(video)
            }
            Ok(Outcome::NoMatch { queries_issued }) => {
                tracing::info!(
                    "No video for {:?} - {:?} after {} queries",
                    artist,
                    song,
                    queries_issued
                );
                None
            }
            Err(MatchError::Configuration(message)) => {
                tracing::warn!("Video search not configured: {}", message);
                if !self.cache_configuration_errors {
                    // No search ran, so the key must not cool down
                    self.limiter.clear_attempt(&limit_key);
                    return Err(ResolveError::Configuration(message));
                }
                None
            }
            Err(e @ MatchError::Unavailable { .. }) => {
                // Outage or exhausted quota; keep the cool-down but cache nothing
                tracing::warn!("{}", e);
                return Err(ResolveError::Unavailable(e.to_string()));
            }
        };

        self.persist(&cache_key, video.as_ref()).await;

        Ok(match video {
            Some(video) => MatchResult::Found {
                video,
                origin: MatchOrigin::Search,
            },
            None => MatchResult::NotFound {
                origin: MatchOrigin::Search,
            },
        })
    }

    /// Read the cache, treating a store failure as a miss.
    async fn cached(&self, cache_key: &str) -> Option<CachedMatch> {
        match self.store.get(cache_key).await {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!("Cache read failed for {}: {}", cache_key, e);
                None
            }
        }
    }

    async fn persist(&self, cache_key: &str, video: Option<&VideoMatch>) {
        if let Err(e) = self.store.put(cache_key, video).await {
            tracing::warn!("Cache write failed for {}: {}", cache_key, e);
        }
    }
}

fn cached_result(record: CachedMatch, origin: MatchOrigin) -> MatchResult {
    match record.video {
        Some(video) => MatchResult::Found { video, origin },
        None => MatchResult::NotFound { origin },
    }
}

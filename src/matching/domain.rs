//! Internal domain models for track-to-video matching.
//!
//! These types are OUR types - they don't change when the search provider changes.
//! Provider responses get converted into [`SearchResult`] via adapters.

use serde::Serialize;

/// Base URL used to build embeddable player links.
pub const EMBED_BASE_URL: &str = "https://www.youtube.com/embed/";

/// A single video returned by the external search API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    /// Provider video ID
    pub video_id: String,
    /// Video title as published
    pub title: String,
    /// Display name of the publishing channel
    pub channel_title: String,
    /// Best available thumbnail
    pub thumbnail_url: Option<String>,
}

/// The video chosen for a track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoMatch {
    pub video_id: String,
    pub title: String,
    pub channel_title: String,
    pub thumbnail_url: Option<String>,
    pub embed_url: String,
}

impl VideoMatch {
    /// Build the match for a winning search result.
    pub fn from_result(result: SearchResult) -> Self {
        let embed_url = embed_url(&result.video_id);
        Self {
            video_id: result.video_id,
            title: result.title,
            channel_title: result.channel_title,
            thumbnail_url: result.thumbnail_url,
            embed_url,
        }
    }
}

/// Embeddable player URL for a video ID.
pub fn embed_url(video_id: &str) -> String {
    format!("{EMBED_BASE_URL}{video_id}")
}

/// A search result that passed the reasonable-match gate.
///
/// Lives only for the duration of one orchestrator run.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub result: SearchResult,
    /// Raw score, may be negative
    pub score: i32,
    pub is_official: bool,
    /// Position of the query that produced this candidate
    pub query_index: usize,
}

/// Where a [`MatchResult`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchOrigin {
    /// Fresh search against the external API
    Search,
    /// Served from the cache
    Cache,
    /// Served from the cache while the key was cooling down
    RateLimitedCache,
    /// Cooling down with nothing cached; NOT a confirmed negative
    RateLimited,
}

/// Outcome of resolving an (artist, song) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MatchResult {
    Found {
        #[serde(flatten)]
        video: VideoMatch,
        origin: MatchOrigin,
    },
    NotFound {
        origin: MatchOrigin,
    },
}

impl MatchResult {
    pub fn found(&self) -> bool {
        matches!(self, MatchResult::Found { .. })
    }

    pub fn video(&self) -> Option<&VideoMatch> {
        match self {
            MatchResult::Found { video, .. } => Some(video),
            MatchResult::NotFound { .. } => None,
        }
    }

    pub fn origin(&self) -> MatchOrigin {
        match self {
            MatchResult::Found { origin, .. } | MatchResult::NotFound { origin } => *origin,
        }
    }

    /// True when no external search ran for this call.
    pub fn from_cache(&self) -> bool {
        matches!(
            self.origin(),
            MatchOrigin::Cache | MatchOrigin::RateLimitedCache
        )
    }

    /// True when this negative is only a cool-down artifact.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, MatchResult::NotFound { origin: MatchOrigin::RateLimited })
    }
}

/// Errors from a single call to the external search API.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SearchError {
    #[error("No API credential configured for video search")]
    MissingCredential,

    #[error("Network error: {0}")]
    Network(String),

    #[error("API request failed: {0}")]
    Api(String),

    #[error("Search quota exceeded")]
    QuotaExceeded,

    #[error("Failed to parse response: {0}")]
    Parse(String),
}

impl SearchError {
    /// Whether the API is unreachable for every query, not just this one.
    pub fn is_configuration(&self) -> bool {
        matches!(self, SearchError::MissingCredential)
    }
}

/// Errors that abort a whole orchestrator run.
///
/// "No match" is not an error; see [`crate::matching::orchestrator::Outcome`].
#[derive(Debug, Clone, thiserror::Error)]
pub enum MatchError {
    #[error("Video search is not configured: {0}")]
    Configuration(String),

    /// No query in the run got an answer from the API.
    #[error("Video search unavailable: all {failed} queries failed (last: {last})")]
    Unavailable { failed: usize, last: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_video() -> VideoMatch {
        VideoMatch::from_result(SearchResult {
            video_id: "abc123".to_string(),
            title: "Song".to_string(),
            channel_title: "ArtistVEVO".to_string(),
            thumbnail_url: None,
        })
    }

    #[test]
    fn test_embed_url_built_from_id() {
        let video = sample_video();
        assert_eq!(video.embed_url, "https://www.youtube.com/embed/abc123");
    }

    #[test]
    fn test_from_cache_flags() {
        let hit = MatchResult::Found {
            video: sample_video(),
            origin: MatchOrigin::Cache,
        };
        assert!(hit.found());
        assert!(hit.from_cache());
        assert!(!hit.is_rate_limited());

        let limited = MatchResult::NotFound {
            origin: MatchOrigin::RateLimited,
        };
        assert!(!limited.found());
        assert!(!limited.from_cache());
        assert!(limited.is_rate_limited());
    }

    #[test]
    fn test_serializes_flat_json() {
        let hit = MatchResult::Found {
            video: sample_video(),
            origin: MatchOrigin::Search,
        };
        let json = serde_json::to_value(&hit).unwrap();
        assert_eq!(json["status"], "found");
        assert_eq!(json["videoId"], "abc123");
        assert_eq!(json["origin"], "search");
    }

    #[test]
    fn test_only_missing_credential_is_configuration() {
        assert!(SearchError::MissingCredential.is_configuration());
        assert!(!SearchError::Network("timeout".into()).is_configuration());
        assert!(!SearchError::QuotaExceeded.is_configuration());
    }
}

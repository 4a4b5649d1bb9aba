//! Trait definition for the external video search API.
//!
//! The orchestrator only talks to [`VideoSearchApi`], so tests can swap in a
//! scripted mock and count exactly which queries were issued.

use async_trait::async_trait;

use super::domain::{SearchError, SearchResult};

/// Text search over videos.
///
/// Implementations are expected to restrict results to videos of medium
/// duration, ordered by relevance, capped at `max_results`.
#[async_trait]
pub trait VideoSearchApi: Send + Sync {
    async fn search(
        &self,
        query: &str,
        max_results: u32,
    ) -> Result<Vec<SearchResult>, SearchError>;
}

#[async_trait]
impl VideoSearchApi for super::youtube::YouTubeClient {
    async fn search(
        &self,
        query: &str,
        max_results: u32,
    ) -> Result<Vec<SearchResult>, SearchError> {
        self.search_videos(query, max_results).await
    }
}

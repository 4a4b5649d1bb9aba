//! YouTube Data API HTTP client
//!
//! Handles communication with the `search.list` endpoint.
//! See: https://developers.google.com/youtube/v3/docs/search/list
//!
//! Every search is restricted to `type=video`, `videoDuration=medium`
//! (4 to 20 minutes, which excludes shorts and hour-long mixes) and
//! `order=relevance`.
//!
//! The API key travels as the `key` query parameter. A client built without
//! a key still constructs fine; every search then fails with
//! [`SearchError::MissingCredential`] so callers can tell misconfiguration
//! apart from "no results".

use super::{adapter, dto};
use crate::matching::domain::{SearchError, SearchResult};

/// Default API endpoint
pub const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/youtube/v3/search";

/// YouTube search client
pub struct YouTubeClient {
    api_key: Option<String>,
    http_client: reqwest::Client,
    base_url: String,
}

impl YouTubeClient {
    /// Create a new client with an optional API key
    pub fn new(api_key: Option<String>) -> Result<Self, SearchError> {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Create a client against a custom endpoint
    pub fn with_base_url(
        api_key: Option<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, SearchError> {
        let http_client = reqwest::Client::builder()
            .gzip(true)
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()
            .map_err(|e| SearchError::Network(e.to_string()))?;

        Ok(Self {
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            http_client,
            base_url: base_url.into(),
        })
    }

    /// Whether a credential is available at all
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Search for videos matching `query`
    pub async fn search_videos(
        &self,
        query: &str,
        max_results: u32,
    ) -> Result<Vec<SearchResult>, SearchError> {
        let api_key = self.api_key.as_deref().ok_or(SearchError::MissingCredential)?;
        let response = self.send_search_request(api_key, query, max_results).await?;
        Ok(adapter::to_search_results(response))
    }

    fn search_url(&self, api_key: &str, query: &str, max_results: u32) -> String {
        format!(
            "{}?part=snippet&type=video&videoDuration=medium&order=relevance&maxResults={}&q={}&key={}",
            self.base_url,
            max_results,
            urlencoding::encode(query),
            urlencoding::encode(api_key)
        )
    }

    /// Send the HTTP request and parse the response
    async fn send_search_request(
        &self,
        api_key: &str,
        query: &str,
        max_results: u32,
    ) -> Result<dto::SearchListResponse, SearchError> {
        let url = self.search_url(api_key, query, max_results);

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| SearchError::Network(e.to_string()))?;

        let status = response.status();

        if !status.is_success() {
            if let Ok(body) = response.json::<dto::ErrorResponse>().await {
                if body.error.errors.iter().any(|e| e.reason == "quotaExceeded") {
                    return Err(SearchError::QuotaExceeded);
                }
                return Err(SearchError::Api(format!(
                    "HTTP {}: {}",
                    body.error.code, body.error.message
                )));
            }
            return Err(SearchError::Network(format!(
                "HTTP {}: {}",
                status,
                status.canonical_reason().unwrap_or("Unknown")
            )));
        }

        response
            .json::<dto::SearchListResponse>()
            .await
            .map_err(|e| SearchError::Parse(e.to_string()))
    }
}

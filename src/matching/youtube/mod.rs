//! YouTube Data API integration
//!
//! Text search over videos via the v3 `search.list` endpoint.
//! API docs: https://developers.google.com/youtube/v3/docs/search/list

mod adapter;
mod client;
pub mod dto;

pub use adapter::to_search_results;
pub use client::YouTubeClient;

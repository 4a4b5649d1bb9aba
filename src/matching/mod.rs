//! Track-to-video matching - finds the official video for a radio spin.
//!
//! # Architecture
//!
//! This module follows a clean separation between:
//! - **Domain models** (`domain.rs`) - Internal types for results and errors
//! - **API DTOs** (`youtube/dto.rs`) - Exact API response shapes
//! - **Adapters** - Convert DTOs to domain models
//! - **Clients** - HTTP client for the search API
//! - **Heuristics** - `normalize`, `queries`, `channel`, `scoring`
//! - **Orchestrator** - Runs the query plan and picks a winner
//!
//! There is no canonical ID linking a spin to a video, so the winner is
//! chosen by scoring noisy titles. Caching of the decision lives one layer
//! up, in [`crate::gateway`].
//!
//! # Usage
//!
//! ```ignore
//! use matching::{Matcher, MatcherConfig, NormalizedTrack, YouTubeClient};
//!
//! let client = Arc::new(YouTubeClient::new(Some(api_key))?);
//! let matcher = Matcher::new(client, MatcherConfig::default());
//! let outcome = matcher.find_match(&NormalizedTrack::new("The Weeknd", "Blinding Lights")).await?;
//! ```

pub mod channel;
pub mod domain;
pub mod normalize;
pub mod orchestrator;
pub mod queries;
pub mod scoring;
pub mod traits;
pub mod youtube;

pub use domain::{MatchError, MatchOrigin, MatchResult, SearchError, SearchResult, VideoMatch};
pub use normalize::NormalizedTrack;
pub use orchestrator::{Matcher, MatcherConfig, Outcome};
pub use traits::VideoSearchApi;
pub use youtube::YouTubeClient;

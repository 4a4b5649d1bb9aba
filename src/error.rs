//! Application-wide error types.
//!
//! This module provides a unified error hierarchy for the application.
//! Library modules use specific error types via `thiserror`, while
//! CLI/main uses `anyhow` for convenient error propagation.
//!
//! # Design
//!
//! - [`Error`]: Top-level application error enum
//! - Module-specific errors (e.g., [`ResolveError`], [`StoreError`]) for detailed handling
//! - All errors implement `std::error::Error` for compatibility
//!
//! # Example
//!
//! ```ignore
//! use spin_match::error::{Error, Result, ResultExt};
//!
//! async fn open(url: &str) -> Result<SqlitePool> {
//!     db::init_db(url).await.with_context("opening match cache")
//! }
//! ```

use crate::config::ConfigError;
use crate::gateway::{ResolveError, StoreError};
use crate::matching::domain::SearchError;

/// Application-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level application error.
///
/// Aggregates errors from all subsystems for unified handling.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Match cache error
    #[error("Cache error: {0}")]
    Store(#[from] StoreError),

    /// Search API client error
    #[error("Search error: {0}")]
    Search(#[from] SearchError),

    /// Resolution error surfaced to callers
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// Configuration file error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Add context to an error.
    pub fn context(self, ctx: impl Into<String>) -> Self {
        Self::WithContext {
            context: ctx.into(),
            source: Box::new(self),
        }
    }
}

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn with_context(self, ctx: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for std::result::Result<T, sqlx::Error> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::Database(e).context(ctx))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, StoreError> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::Store(e).context(ctx))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, SearchError> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::Search(e).context(ctx))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, ResolveError> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::Resolve(e).context(ctx))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, ConfigError> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::Config(e).context(ctx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_error_is_transparent() {
        let err: Error = ResolveError::InvalidInput("artist and song are required".into()).into();
        assert_eq!(err.to_string(), "Invalid input: artist and song are required");
    }

    #[test]
    fn test_error_with_context() {
        let err = Error::from(SearchError::MissingCredential).context("while resolving");
        let msg = err.to_string();
        assert!(msg.contains("while resolving"));
        assert!(msg.contains("No API credential"));
    }

    #[test]
    fn test_resolve_context_keeps_source_message() {
        let result: std::result::Result<(), ResolveError> =
            Err(ResolveError::Unavailable("quota".into()));
        let msg = result.with_context("resolving Adele - Hello").unwrap_err().to_string();
        assert_eq!(msg, "resolving Adele - Hello: Video search is unavailable: quota");
    }

    #[test]
    fn test_result_ext() {
        let result: std::result::Result<(), SearchError> = Err(SearchError::QuotaExceeded);
        let with_ctx = result.with_context("additional context");
        assert!(with_ctx.unwrap_err().to_string().contains("additional context"));
    }
}

//! Configuration system using TOML files.
//!
//! Config is stored in the OS-standard config directory:
//! - Windows: %APPDATA%\spin-match\config.toml
//! - macOS: ~/Library/Application Support/spin-match/config.toml
//! - Linux: ~/.config/spin-match/config.toml
//!
//! The config file is human-readable and editable. The YouTube API key can
//! also come from the `YOUTUBE_API_KEY` environment variable, which wins
//! over the file.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::gateway::InMemoryRateLimiter;
use crate::matching::MatcherConfig;

/// Environment variable that overrides `credentials.youtube_api_key`
pub const API_KEY_ENV: &str = "YOUTUBE_API_KEY";

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// API credentials (keep separate for potential future encryption)
    pub credentials: Credentials,

    /// Query plan and early-stop tuning
    pub matching: MatchingConfig,

    /// Per-key search cool-down
    pub rate_limit: RateLimitConfig,

    /// Match cache settings
    pub cache: CacheConfig,
}

/// API credentials
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Credentials {
    /// YouTube Data API key for search.list
    pub youtube_api_key: Option<String>,
}

/// Matching settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    /// Maximum search queries per resolution
    pub max_queries: usize,

    /// Results requested per query
    pub page_size: u32,

    /// Pause between consecutive searches, in milliseconds
    pub politeness_delay_ms: u64,

    /// Score an official candidate needs to end the search early
    pub early_stop_score: i32,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        let defaults = MatcherConfig::default();
        Self {
            max_queries: defaults.max_queries,
            page_size: defaults.page_size,
            politeness_delay_ms: defaults.politeness_delay.as_millis() as u64,
            early_stop_score: defaults.early_stop_score,
        }
    }
}

impl MatchingConfig {
    pub fn to_matcher_config(&self) -> MatcherConfig {
        MatcherConfig {
            max_queries: self.max_queries,
            page_size: self.page_size,
            politeness_delay: Duration::from_millis(self.politeness_delay_ms),
            early_stop_score: self.early_stop_score,
        }
    }
}

/// Rate limiter settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Seconds a key stays throttled after a search attempt
    pub cooldown_secs: u64,

    /// Attempts tracked before old entries are evicted
    pub max_entries: usize,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            cooldown_secs: crate::gateway::rate_limit::DEFAULT_COOLDOWN.as_secs(),
            max_entries: crate::gateway::rate_limit::DEFAULT_MAX_ENTRIES,
        }
    }
}

impl RateLimitConfig {
    pub fn build_limiter(&self) -> InMemoryRateLimiter {
        InMemoryRateLimiter::new(Duration::from_secs(self.cooldown_secs), self.max_entries)
    }
}

/// Match cache settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// SQLite database file (empty = `spin_match.db` in the working directory)
    pub database: Option<PathBuf>,

    /// Keep a process-local copy of every decision in front of SQLite
    pub memory_tier: bool,

    /// Store a missing API key as a permanent "not found"
    pub cache_configuration_errors: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            database: None,
            memory_tier: true,
            cache_configuration_errors: false,
        }
    }
}

impl Config {
    /// The API key, preferring the environment over the file.
    pub fn youtube_api_key(&self) -> Option<String> {
        self.youtube_api_key_with(std::env::var(API_KEY_ENV).ok())
    }

    /// Store (or with `None`, remove) the API key in the file credentials.
    pub fn set_youtube_api_key(&mut self, key: Option<&str>) {
        self.credentials.youtube_api_key = key
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());
    }

    /// A copy safe to print, with the stored API key masked.
    pub fn redacted(&self) -> Config {
        let mut copy = self.clone();
        copy.credentials.youtube_api_key = self.credentials.youtube_api_key.as_deref().map(mask);
        copy
    }

    fn youtube_api_key_with(&self, from_env: Option<String>) -> Option<String> {
        from_env
            .or_else(|| self.credentials.youtube_api_key.clone())
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
    }
}

fn mask(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 4 {
        return "****".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("****{}", tail)
}

// ============================================================================
// Config File Operations
// ============================================================================

/// Get the config directory path
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("spin-match"))
}

/// Get the full path to the config file
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}

/// Load configuration from disk
///
/// Returns default config if file doesn't exist or can't be parsed.
/// Logs warnings but doesn't fail - we always return a usable config.
pub fn load() -> Config {
    let Some(path) = config_path() else {
        tracing::warn!("Could not determine config directory, using defaults");
        return Config::default();
    };

    if !path.exists() {
        tracing::debug!("No config file found at {:?}, using defaults", path);
        return Config::default();
    }

    match std::fs::read_to_string(&path) {
        Ok(contents) => match toml::from_str(&contents) {
            Ok(config) => {
                tracing::debug!("Loaded config from {:?}", path);
                config
            }
            Err(e) => {
                tracing::error!("Failed to parse config file {:?}: {}", path, e);
                tracing::warn!("Using default configuration");
                Config::default()
            }
        },
        Err(e) => {
            tracing::error!("Failed to read config file {:?}: {}", path, e);
            Config::default()
        }
    }
}

/// Save configuration to disk
///
/// Creates the config directory if it doesn't exist.
pub fn save(config: &Config) -> Result<(), ConfigError> {
    let dir = config_dir().ok_or(ConfigError::NoConfigDir)?;
    save_to(config, &dir.join("config.toml"))
}

fn save_to(config: &Config, path: &std::path::Path) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|e| ConfigError::CreateDir(dir.to_path_buf(), e))?;
    }

    let contents = toml::to_string_pretty(config).map_err(ConfigError::Serialize)?;

    // Write atomically (write to temp, then rename)
    let temp_path = path.with_extension("toml.tmp");
    std::fs::write(&temp_path, &contents).map_err(|e| ConfigError::Write(temp_path.clone(), e))?;
    std::fs::rename(&temp_path, path)
        .map_err(|e| ConfigError::Rename(temp_path, path.to_path_buf(), e))?;

    tracing::info!("Saved config to {:?}", path);
    Ok(())
}

// ============================================================================
// Error Types
// ============================================================================

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to create config directory {0}: {1}")]
    CreateDir(PathBuf, std::io::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(toml::ser::Error),

    #[error("Failed to write config to {0}: {1}")]
    Write(PathBuf, std::io::Error),

    #[error("Failed to rename temp file {0} to {1}: {2}")]
    Rename(PathBuf, PathBuf, std::io::Error),
}

// ============================================================================
// Tests
// ============================================================================

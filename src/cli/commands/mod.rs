//! CLI command definitions and dispatch.
//!
//! Each subcommand is implemented in a submodule:
//! - `resolve`: Cached resolution through the gateway, and raw cache lookup
//! - `inspect`: Query plan preview and cache statistics
//! - `settings`: Config file and API key management

mod inspect;
mod resolve;
mod settings;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tokio::runtime::Runtime;

use crate::config::{self, Config};
use crate::db;
use crate::error::{self, ResultExt};

pub use inspect::{cmd_queries, cmd_stats};
pub use resolve::{cmd_lookup, cmd_resolve};
pub use settings::{cmd_config_path, cmd_config_set_key, cmd_config_show};

/// Spin Match CLI
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Database path (overrides the config file)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Find the video for a track, searching only on a cache miss
    Resolve {
        /// Artist as announced
        artist: String,
        /// Song title as announced
        song: String,
        /// YouTube Data API key (or set YOUTUBE_API_KEY env var)
        #[arg(short, long, env = "YOUTUBE_API_KEY", hide_env_values = true)]
        api_key: Option<String>,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the cached decision for a track without searching
    Lookup {
        artist: String,
        song: String,
    },
    /// Print the search queries a resolution would try, in order
    Queries {
        artist: String,
        song: String,
    },
    /// Show match cache statistics
    Stats,
    /// Inspect or edit the config file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// `config` subcommands
#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the config file location
    Path,
    /// Print the effective configuration (API key masked)
    Show,
    /// Save the YouTube Data API key to the config file
    SetKey {
        key: String,
    },
    /// Remove the saved API key
    ClearKey,
}

/// Run the specified CLI command.
pub fn run_command(cli: &Cli) -> anyhow::Result<()> {
    let rt = Runtime::new()?;
    let config = config::load();

    match &cli.command {
        Commands::Resolve {
            artist,
            song,
            api_key,
            json,
        } => {
            let db_url = database_url(cli, &config);
            cmd_resolve(&rt, &config, &db_url, artist, song, api_key.as_deref(), *json)
        }
        Commands::Lookup { artist, song } => {
            cmd_lookup(&rt, &database_url(cli, &config), artist, song)
        }
        Commands::Queries { artist, song } => cmd_queries(artist, song),
        Commands::Stats => cmd_stats(&rt, &database_url(cli, &config)),
        Commands::Config { action } => match action {
            ConfigAction::Path => cmd_config_path(),
            ConfigAction::Show => cmd_config_show(&config),
            ConfigAction::SetKey { key } => cmd_config_set_key(config, Some(key.as_str())),
            ConfigAction::ClearKey => cmd_config_set_key(config, None),
        },
    }
}

// ============================================================================
// Shared helper functions
// ============================================================================

/// Open the match cache, creating and migrating it if needed.
pub(crate) async fn open_pool(db_url: &str) -> error::Result<sqlx::SqlitePool> {
    db::init_db(db_url)
        .await
        .with_context(format!("opening match cache at {}", db_url))
}

/// `--db` wins over `cache.database` in the config file.
fn database_url(cli: &Cli, config: &Config) -> String {
    db::db_url(cli.db.as_deref().or(config.cache.database.as_deref()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_resolve() {
        let cli = Cli::try_parse_from([
            "spin-match",
            "resolve",
            "The Weeknd",
            "Blinding Lights",
            "--json",
            "--api-key",
            "k",
        ])
        .unwrap();

        match cli.command {
            Commands::Resolve {
                artist,
                song,
                api_key,
                json,
            } => {
                assert_eq!(artist, "The Weeknd");
                assert_eq!(song, "Blinding Lights");
                assert_eq!(api_key.as_deref(), Some("k"));
                assert!(json);
            }
            _ => panic!("expected resolve"),
        }
    }

    #[test]
    fn test_cli_parses_config_set_key() {
        let cli = Cli::try_parse_from(["spin-match", "config", "set-key", "AIzaExample"]).unwrap();
        match cli.command {
            Commands::Config {
                action: ConfigAction::SetKey { key },
            } => assert_eq!(key, "AIzaExample"),
            _ => panic!("expected config set-key"),
        }
    }

    #[test]
    fn test_db_flag_overrides_config() {
        let cli = Cli::try_parse_from(["spin-match", "stats", "--db", "/tmp/x.db"]).unwrap();
        let mut config = Config::default();
        config.cache.database = Some(PathBuf::from("/var/other.db"));

        assert_eq!(database_url(&cli, &config), "sqlite:/tmp/x.db");
    }

    #[test]
    fn test_config_database_used_without_flag() {
        let cli = Cli::try_parse_from(["spin-match", "stats"]).unwrap();
        let mut config = Config::default();
        config.cache.database = Some(PathBuf::from("/var/other.db"));

        assert_eq!(database_url(&cli, &config), "sqlite:/var/other.db");
    }
}

//! Config file inspection and credential management.

use crate::config::{self, Config};
use crate::error::ResultExt;

/// Print where the config file lives
pub fn cmd_config_path() -> anyhow::Result<()> {
    match config::config_path() {
        Some(path) => println!("{}", path.display()),
        None => anyhow::bail!("could not determine the config directory"),
    }
    Ok(())
}

/// Print the effective config with the API key masked
pub fn cmd_config_show(config: &Config) -> anyhow::Result<()> {
    print!("{}", toml::to_string_pretty(&config.redacted())?);
    if std::env::var_os(config::API_KEY_ENV).is_some() {
        println!();
        println!("# {} is set and overrides youtube_api_key", config::API_KEY_ENV);
    }
    Ok(())
}

/// Store or remove the YouTube API key in the config file
pub fn cmd_config_set_key(mut config: Config, key: Option<&str>) -> anyhow::Result<()> {
    config.set_youtube_api_key(key);
    config::save(&config).with_context("saving config")?;

    match &config.credentials.youtube_api_key {
        Some(_) => println!("API key saved."),
        None => println!("API key removed."),
    }
    Ok(())
}

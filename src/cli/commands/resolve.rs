//! Resolution and cache lookup commands.

use std::sync::Arc;

use tokio::runtime::Runtime;

use super::open_pool;
use crate::config::Config;
use crate::error::ResultExt;
use crate::gateway::{MatchGateway, MatchStore, SqliteMatchStore, TieredStore};
use crate::matching::{MatchResult, Matcher, YouTubeClient, normalize};

/// Resolve a track through the cache, searching on a miss
pub fn cmd_resolve(
    rt: &Runtime,
    config: &Config,
    db_url: &str,
    artist: &str,
    song: &str,
    api_key: Option<&str>,
    json: bool,
) -> anyhow::Result<()> {
    rt.block_on(async {
        let pool = open_pool(db_url).await?;

        let api_key = api_key.map(str::to_string).or_else(|| config.youtube_api_key());
        let gateway = build_gateway(config, pool, api_key)?;

        let result = gateway
            .resolve(artist, song)
            .await
            .with_context(format!("resolving {} - {}", artist, song))?;
        if json {
            println!("{}", serde_json::to_string_pretty(&result)?);
        } else {
            print_result(artist, song, &result);
        }
        Ok(())
    })
}

/// Show the cached decision for a track without touching the search API
pub fn cmd_lookup(rt: &Runtime, db_url: &str, artist: &str, song: &str) -> anyhow::Result<()> {
    let key = normalize::cache_key(artist, song);
    if key.is_empty() {
        anyhow::bail!("no searchable characters in {:?} / {:?}", artist, song);
    }

    rt.block_on(async {
        let pool = open_pool(db_url).await?;
        let store = SqliteMatchStore::new(pool);

        match store.get(&key).await.with_context("reading cached decision")? {
            Some(record) => {
                println!("Key:      {}", record.cache_key);
                match &record.video {
                    Some(video) => {
                        println!("Video:    {} ({})", video.title, video.video_id);
                        println!("Channel:  {}", video.channel_title);
                        println!("Embed:    {}", video.embed_url);
                    }
                    None => println!("Video:    none (cached negative)"),
                }
                println!("Created:  {}", record.created_at.to_rfc3339());
                println!("Updated:  {}", record.updated_at.to_rfc3339());
            }
            None => println!("No cached decision for {}", key),
        }
        Ok(())
    })
}

/// Wire the search client, cache tiers and limiter from config
fn build_gateway(
    config: &Config,
    pool: sqlx::SqlitePool,
    api_key: Option<String>,
) -> anyhow::Result<MatchGateway> {
    let client = YouTubeClient::new(api_key).with_context("building YouTube client")?;
    let matcher = Matcher::new(Arc::new(client), config.matching.to_matcher_config());

    let durable: Arc<dyn MatchStore> = Arc::new(SqliteMatchStore::new(pool));
    let store: Arc<dyn MatchStore> = if config.cache.memory_tier {
        Arc::new(TieredStore::new(durable))
    } else {
        durable
    };

    Ok(
        MatchGateway::new(matcher, store, Arc::new(config.rate_limit.build_limiter()))
            .cache_configuration_errors(config.cache.cache_configuration_errors),
    )
}

fn print_result(artist: &str, song: &str, result: &MatchResult) {
    let source = if result.from_cache() { "cache" } else { "search" };
    match result.video() {
        Some(video) => {
            println!("{} - {}", artist, song);
            println!("  Video:   {} ({})", video.title, video.video_id);
            println!("  Channel: {}", video.channel_title);
            println!("  Embed:   {}", video.embed_url);
            println!("  Source:  {}", source);
        }
        None if result.is_rate_limited() => {
            println!("{} - {}: searched recently, try again later", artist, song);
        }
        None => {
            println!("{} - {}: no matching video ({})", artist, song, source);
        }
    }
}

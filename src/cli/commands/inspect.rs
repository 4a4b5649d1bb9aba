//! Query plan preview and cache statistics.

use tokio::runtime::Runtime;

use super::open_pool;
use crate::error::ResultExt;
use crate::gateway::SqliteMatchStore;
use crate::matching::NormalizedTrack;
use crate::matching::queries::generate_queries;

/// Print the normalized track and every query in plan order
pub fn cmd_queries(artist: &str, song: &str) -> anyhow::Result<()> {
    let track = NormalizedTrack::new(artist.trim(), song.trim());

    println!("Cache key: {}", track.cache_key());
    println!("Artist:    {}", track.clean_artist);
    println!("Song:      {}", track.clean_song);
    println!();
    for (i, query) in generate_queries(&track).iter().enumerate() {
        println!("{:>2}. {}", i + 1, query);
    }
    Ok(())
}

/// Print match cache counts
pub fn cmd_stats(rt: &Runtime, db_url: &str) -> anyhow::Result<()> {
    rt.block_on(async {
        let pool = open_pool(db_url).await?;
        let stats = SqliteMatchStore::new(pool)
            .stats()
            .await
            .with_context("reading cache statistics")?;

        println!("Cached decisions: {}", stats.total);
        println!("  Found:          {}", stats.found);
        println!("  Not found:      {}", stats.not_found());
        Ok(())
    })
}

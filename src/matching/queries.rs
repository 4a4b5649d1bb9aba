//! Search query generation.
//!
//! Expands one track into an ordered list of distinct query strings, most
//! specific first. The orchestrator stops early, so order matters more than
//! coverage: later queries only run when the earlier ones were inconclusive.

use std::collections::HashSet;

use super::normalize::NormalizedTrack;

/// Quality modifiers appended to `artist song`, in priority order.
pub const QUERY_MODIFIERS: [&str; 5] = ["official", "music video", "audio", "lyrics", "live"];

/// Build the ordered, de-duplicated query plan for a track.
pub fn generate_queries(track: &NormalizedTrack) -> Vec<String> {
    let artist = track.clean_artist.as_str();
    let song = track.clean_song.as_str();

    let mut plan = QueryPlan::default();

    plan.push(format!("{artist} {song}"));
    plan.push(format!("{} {}", track.raw_artist, track.raw_song));
    plan.push(format!("{song} {artist}"));

    for modifier in QUERY_MODIFIERS {
        plan.push(format!("{artist} {song} {modifier}"));
    }

    for variant in track.artist_variants() {
        plan.push(format!("{variant} {song}"));
    }

    plan.push(format!("{song} official audio"));
    plan.push(format!("{song} music video"));
    plan.push(song.to_string());

    plan.push(format!("{song} by {artist}"));
    plan.push(format!("{song} {artist} official"));

    plan.into_queries()
}

/// Insertion-ordered set of queries.
#[derive(Default)]
struct QueryPlan {
    queries: Vec<String>,
    seen: HashSet<String>,
}

impl QueryPlan {
    fn push(&mut self, query: String) {
        let query = query.split_whitespace().collect::<Vec<_>>().join(" ");
        if query.is_empty() {
            return;
        }
        if self.seen.insert(query.to_lowercase()) {
            self.queries.push(query);
        }
    }

    fn into_queries(self) -> Vec<String> {
        self.queries
    }
}

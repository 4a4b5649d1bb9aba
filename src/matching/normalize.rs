//! Key normalization and text cleaning for artist/song pairs.
//!
//! Two outputs per request:
//! - a cache key (lower-case, `[a-z0-9]` only, artist then song)
//! - a cleaned comparison form per field, used by the query generator and scorer

use std::sync::LazyLock;

use regex::Regex;

static PARENTHETICAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\([^)]*\)|\[[^\]]*\]").expect("valid regex"));

static FEATURING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:featuring|feat\.|ft\.)").expect("valid regex"));

static NON_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\W").expect("valid regex"));

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Canonical cache key for an (artist, song) pair.
///
/// Punctuation-only differences collapse onto the same key.
pub fn cache_key(artist: &str, song: &str) -> String {
    let mut key = String::with_capacity(artist.len() + song.len());
    for c in artist.chars().chain(song.chars()) {
        let c = c.to_ascii_lowercase();
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            key.push(c);
        }
    }
    key
}

/// Key used by the rate limiter: `lower(artist)-lower(song)`.
pub fn rate_limit_key(artist: &str, song: &str) -> String {
    format!("{}-{}", artist.to_lowercase(), song.to_lowercase())
}

/// Clean a free-text field for comparison.
///
/// Drops `(...)` and `[...]` segments and featuring markers, turns every
/// non-word character into a space, then collapses whitespace. Case is kept.
pub fn clean_text(input: &str) -> String {
    let text = PARENTHETICAL.replace_all(input, " ");
    let text = FEATURING.replace_all(&text, " ");
    let text = NON_WORD.replace_all(&text, " ");
    WHITESPACE.replace_all(&text, " ").trim().to_string()
}

/// Artist with periods removed and a leading "The " stripped.
pub fn simplified_artist(artist: &str) -> String {
    let without_periods = artist.replace('.', "");
    let trimmed = without_periods.trim();
    let stripped = match trimmed.get(..4) {
        Some(prefix) if prefix.eq_ignore_ascii_case("the ") => &trimmed[4..],
        _ => trimmed,
    };
    stripped.trim().to_string()
}

/// Raw and cleaned forms of one request, computed once per resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedTrack {
    pub raw_artist: String,
    pub raw_song: String,
    pub clean_artist: String,
    pub clean_song: String,
}

impl NormalizedTrack {
    pub fn new(artist: &str, song: &str) -> Self {
        Self {
            raw_artist: artist.trim().to_string(),
            raw_song: song.trim().to_string(),
            clean_artist: clean_text(artist),
            clean_song: clean_text(song),
        }
    }

    pub fn cache_key(&self) -> String {
        cache_key(&self.raw_artist, &self.raw_song)
    }

    /// Distinct spellings of the artist, raw first.
    pub fn artist_variants(&self) -> Vec<String> {
        let mut variants = vec![self.raw_artist.clone()];
        if self.clean_artist != self.raw_artist {
            variants.push(self.clean_artist.clone());
        }
        let simplified = simplified_artist(&self.raw_artist);
        if !simplified.is_empty() && !variants.contains(&simplified) {
            variants.push(simplified);
        }
        variants
    }
}

//! Candidate scoring.
//!
//! Two stages:
//! 1. [`is_reasonable_match`] - a cheap gate that throws away results with no
//!    real relation to the track
//! 2. [`score_result`] - the full relevance/quality score used for ranking
//!
//! All comparisons run on a flattened, lower-case form of the title so that
//! punctuation like "AC/DC" or "T.N.T." lines up with the cleaned target.

use std::sync::LazyLock;

use regex::Regex;

use super::channel::{TOPIC_SUFFIX, is_official_channel};
use super::normalize::{NormalizedTrack, clean_text, simplified_artist};

static NON_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\W+").expect("valid regex"));

/// Words too common to count as a fuzzy overlap on their own.
const STOPWORDS: [&str; 2] = ["the", "and"];

/// Shortest token allowed to satisfy a word-overlap match.
const MIN_TOKEN_LEN: usize = 3;

/// Gate score at which a candidate is accepted without both fields present.
const GATE_THRESHOLD: i32 = 4;

/// Lower-cased comparison forms of the track being matched.
#[derive(Debug, Clone)]
pub struct MatchTarget {
    pub artist: String,
    pub song: String,
    artist_variants: Vec<String>,
}

impl MatchTarget {
    pub fn new(track: &NormalizedTrack) -> Self {
        let artist = flatten(&track.clean_artist);
        let song = flatten(&track.clean_song);

        let mut artist_variants = vec![artist.clone()];
        let simplified = flatten(&clean_text(&simplified_artist(&track.raw_artist)));
        if !simplified.is_empty() && !artist_variants.contains(&simplified) {
            artist_variants.push(simplified);
        }
        artist_variants.retain(|v| !v.is_empty());

        Self {
            artist,
            song,
            artist_variants,
        }
    }

    fn artist_present(&self, title: &str) -> bool {
        self.artist_variants.iter().any(|v| fuzzy_contains(title, v))
    }

    fn song_present(&self, title: &str) -> bool {
        fuzzy_contains(title, &self.song)
    }
}

/// Lower-case, punctuation to single spaces, trimmed.
fn flatten(text: &str) -> String {
    NON_WORD
        .replace_all(&text.to_lowercase(), " ")
        .trim()
        .to_string()
}

/// Exact substring, or any significant word of `needle` appearing as a word
/// of `haystack`. Both sides must already be flattened.
pub fn fuzzy_contains(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }
    if haystack.contains(needle) {
        return true;
    }
    needle
        .split_whitespace()
        .filter(|t| t.len() >= MIN_TOKEN_LEN && !STOPWORDS.contains(t))
        .any(|t| haystack.split_whitespace().any(|w| w == t))
}

/// Cheap filter applied before full scoring.
///
/// Accepts when the gate score reaches [`GATE_THRESHOLD`], or when both artist
/// and song are present regardless of score.
pub fn is_reasonable_match(title: &str, channel_title: &str, target: &MatchTarget) -> bool {
    let title = flatten(title);
    let artist_present = target.artist_present(&title);
    let song_present = target.song_present(&title);

    let mut score = 0;
    if artist_present {
        score += 3;
    }
    if song_present {
        score += 3;
    }
    if title.contains("official") {
        score += 1;
    }
    if title.contains("audio") {
        score += 1;
    }
    if title.contains("music video") {
        score += 1;
    }
    if is_official_channel(channel_title) {
        score += 2;
    }
    if title.contains("cover") {
        score -= 2;
    }
    if title.contains("remix") {
        score -= 1;
    }
    if title.contains("karaoke") {
        score -= 3;
    }
    if title.contains("instrumental") {
        score -= 2;
    }

    score >= GATE_THRESHOLD || (artist_present && song_present)
}

/// Full relevance and quality score. May be negative.
pub fn score_result(title: &str, channel_title: &str, target: &MatchTarget) -> i32 {
    let title = flatten(title);
    let channel = channel_title.to_lowercase();
    let official = title.contains("official");

    let mut score = 0;

    if !target.artist.is_empty() && title.contains(&target.artist) {
        score += 3;
    }
    if !target.song.is_empty() && title.contains(&target.song) {
        score += 3;
    }
    if !target.artist.is_empty() && !target.song.is_empty() {
        let forward = format!("{} {}", target.artist, target.song);
        let reverse = format!("{} {}", target.song, target.artist);
        if title.contains(&forward) || title.contains(&reverse) {
            score += 2;
        }
    }

    if is_official_channel(channel_title) {
        score += 3;
    }
    if channel.contains("vevo") {
        score += 2;
    }
    if channel.ends_with(TOPIC_SUFFIX) {
        score += 2;
    }

    if official {
        score += 2;
    }
    if title.contains("music video") {
        score += 1;
    }
    if title.contains("audio") {
        score += 1;
    }
    if title.contains("hd") || title.contains("high quality") {
        score += 1;
    }

    if title.contains("cover") && !official {
        score -= 2;
    }
    if title.contains("remix") && !official {
        score -= 1;
    }
    if title.contains("karaoke") {
        score -= 3;
    }
    if title.contains("instrumental") {
        score -= 2;
    }
    if title.contains("lyrics") && !official {
        score -= 1;
    }

    score
}

/// Clamp a raw score to the reported range.
pub fn floor_score(raw: i32) -> u32 {
    raw.max(0) as u32
}

/// Headline quality score, floored at zero.
pub fn quality_score(title: &str, channel_title: &str, target: &MatchTarget) -> u32 {
    floor_score(score_result(title, channel_title, target))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(artist: &str, song: &str) -> MatchTarget {
        MatchTarget::new(&NormalizedTrack::new(artist, song))
    }

    #[test]
    fn test_official_video_scores_high() {
        let t = target("The Weeknd", "Blinding Lights");
        let score = score_result(
            "The Weeknd - Blinding Lights (Official Video)",
            "TheWeekndVEVO",
            &t,
        );
        // 3 + 3 + 2 (artist, song, adjacency) + 3 + 2 (official VEVO channel) + 2 (official)
        assert_eq!(score, 15);
    }

    #[test]
    fn test_topic_channel_bonus() {
        let t = target("Adele", "Hello");
        let score = score_result("Hello", "Adele - Topic", &t);
        // song + official channel + topic suffix
        assert_eq!(score, 3 + 3 + 2);
    }

    #[test]
    fn test_penalties_can_go_negative() {
        let t = target("Adele", "Hello");
        let raw = score_result("Karaoke instrumental backing track", "KaraokeKing", &t);
        assert_eq!(raw, -5);
        assert_eq!(quality_score("Karaoke instrumental backing track", "KaraokeKing", &t), 0);
        assert_eq!(floor_score(raw), 0);
        assert_eq!(floor_score(7), 7);
    }

    #[test]
    fn test_official_cancels_cover_and_lyrics_penalties() {
        let t = target("Adele", "Hello");
        let fan = score_result("Adele Hello cover lyrics", "SomeFan", &t);
        let official = score_result("Adele Hello cover lyrics official", "SomeFan", &t);
        assert_eq!(fan, 8 - 2 - 1);
        assert_eq!(official, 8 + 2);
    }

    #[test]
    fn test_punctuation_in_title_still_matches() {
        let t = target("AC/DC", "T.N.T.");
        let score = score_result("AC/DC - T.N.T. (Official Video)", "acdcVEVO", &t);
        assert!(score >= 8, "score was {}", score);
    }

    #[test]
    fn test_gate_accepts_artist_and_song() {
        let t = target("Adele", "Hello");
        assert!(is_reasonable_match("Adele - Hello", "RandomFan92", &t));
    }

    #[test]
    fn test_gate_accepts_word_overlap() {
        let t = target("The Weeknd", "Blinding Lights");
        assert!(is_reasonable_match("Weeknd performs Blinding Lights live", "SomeChannel", &t));
    }

    #[test]
    fn test_gate_rejects_unrelated() {
        let t = target("The Weeknd", "Blinding Lights");
        assert!(!is_reasonable_match("Cat videos compilation 2020", "RandomFan92", &t));
        assert!(!is_reasonable_match("The best of the year", "RandomFan92", &t));
    }

    #[test]
    fn test_gate_accepts_artist_on_official_channel() {
        let t = target("Adele", "Hello");
        // artist (3) + official channel (2) clears the threshold without the song
        assert!(is_reasonable_match("Adele - Skyfall", "AdeleVEVO", &t));
    }

    #[test]
    fn test_gate_rejects_artist_only_karaoke() {
        let t = target("Adele", "Hello");
        assert!(!is_reasonable_match("Adele karaoke medley", "KaraokeKing", &t));
    }

    #[test]
    fn test_fuzzy_contains() {
        assert!(fuzzy_contains("blinding lights live", "blinding lights"));
        assert!(fuzzy_contains("lights out", "blinding lights"));
        assert!(!fuzzy_contains("the end", "the weeknd"));
        assert!(!fuzzy_contains("anything", ""));
        assert!(!fuzzy_contains("cd ab", "ab ef"));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Appending "official" never lowers the score
        #[test]
        fn official_is_monotonic(title in "[a-zA-Z0-9 ()-]{0,60}", channel in "[a-zA-Z0-9 ]{0,20}") {
            let t = MatchTarget::new(&NormalizedTrack::new("Adele", "Hello"));
            let base = score_result(&title, &channel, &t);
            let boosted = score_result(&format!("{title} official"), &channel, &t);
            prop_assert!(boosted >= base, "{} -> {}", base, boosted);
        }

        /// Appending "karaoke" never raises the score
        #[test]
        fn karaoke_is_antitonic(title in "[a-zA-Z0-9 ()-]{0,60}", channel in "[a-zA-Z0-9 ]{0,20}") {
            let t = MatchTarget::new(&NormalizedTrack::new("Adele", "Hello"));
            let base = score_result(&title, &channel, &t);
            let penalized = score_result(&format!("{title} karaoke"), &channel, &t);
            prop_assert!(penalized <= base, "{} -> {}", base, penalized);
        }
    }
}

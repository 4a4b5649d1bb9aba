//! Publishing-channel classification.
//!
//! Coarse keyword heuristic. False positives are tolerated because an
//! official channel only adds score, it never gates a candidate.

/// Keywords that mark label, VEVO, and artist-managed channels.
const OFFICIAL_KEYWORDS: [&str; 5] = ["vevo", "records", "music", "official", "label"];

/// Suffix of auto-generated artist channels.
pub const TOPIC_SUFFIX: &str = " - topic";

/// Whether a channel looks label- or artist-managed.
pub fn is_official_channel(channel_title: &str) -> bool {
    let channel = channel_title.to_lowercase();
    OFFICIAL_KEYWORDS.iter().any(|k| channel.contains(k)) || channel.ends_with(TOPIC_SUFFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_channel_is_official() {
        assert!(is_official_channel("Atlantic Records"));
        assert!(is_official_channel("TheWeekndVEVO"));
        assert!(is_official_channel("Universal Music Group"));
    }

    #[test]
    fn test_topic_channel_is_official() {
        assert!(is_official_channel("Artist Name - Topic"));
    }

    #[test]
    fn test_fan_channel_is_not_official() {
        assert!(!is_official_channel("RandomFan92"));
        assert!(!is_official_channel("Topical Tunes"));
    }

    #[test]
    fn test_known_false_positive() {
        assert!(is_official_channel("Music Monday"));
    }
}

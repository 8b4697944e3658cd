//! Small text formatting helpers shared by the renderers.

use std::time::Duration;

/// Format a request duration in milliseconds.
#[must_use]
pub fn format_elapsed_ms(ms: u64) -> String {
    if ms >= 1_000 {
        let tenths = (ms % 1_000) / 100;
        format!("{}.{tenths}s", ms / 1_000)
    } else {
        format!("{ms}ms")
    }
}

/// Format a wall-clock duration the same way as [`format_elapsed_ms`].
#[must_use]
pub fn format_duration(duration: Duration) -> String {
    format_elapsed_ms(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
}

/// First seven characters of a commit hash.
#[must_use]
pub fn short_hash(hash: &str) -> &str {
    hash.char_indices().nth(7).map_or(hash, |(i, _)| &hash[..i])
}

/// Cut `text` to at most `max` characters, marking the cut with `...`.
#[must_use]
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{kept}...")
}

/// "1 deployment" / "3 deployments".
#[must_use]
pub fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{count} {noun}")
    } else {
        format!("{count} {noun}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_below_one_second() {
        assert_eq!(format_elapsed_ms(0), "0ms");
        assert_eq!(format_elapsed_ms(850), "850ms");
    }

    #[test]
    fn elapsed_in_seconds() {
        assert_eq!(format_elapsed_ms(1_234), "1.2s");
        assert_eq!(format_duration(Duration::from_secs(10)), "10.0s");
    }

    #[test]
    fn short_hash_truncates() {
        assert_eq!(short_hash("a999778deadbeef"), "a999778");
        assert_eq!(short_hash("abc"), "abc");
    }

    #[test]
    fn truncate_marks_cut() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghijkl", 8), "abcde...");
    }

    #[test]
    fn plural_forms() {
        assert_eq!(plural(1, "deployment"), "1 deployment");
        assert_eq!(plural(0, "deployment"), "0 deployments");
    }
}

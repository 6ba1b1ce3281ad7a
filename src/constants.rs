//! Cross-cutting, shared constants.
//!
//! Thresholds here define the verdict semantics of the analyzer; the limits bound the work a
//! single request can push through the embedder.

/// Maximum characters kept from any single input string before embedding.
pub const MAX_INPUT_CHARS: usize = 1000;

/// Chunks whose trimmed text is this short (or shorter) are dropped before analysis.
pub const MIN_CHUNK_CHARS: usize = 10;

/// A query counts as answered when its best similarity is strictly above this value.
pub const ANSWERED_THRESHOLD: f32 = 0.4;

/// Matches at or below this similarity never appear in `top_matches`.
pub const MIN_MATCH_SCORE: f32 = 0.1;

/// Number of matches reported per query.
pub const TOP_MATCHES: usize = 3;

/// Answered queries below this confidence are reported as weak matches.
pub const WEAK_CONFIDENCE_THRESHOLD: f32 = 0.6;

/// Similarity-to-confidence scaling factor (clamped to `1.0`).
pub const CONFIDENCE_SCALE: f32 = 2.0;

/// Maximum characters of chunk text included in a match preview.
pub const CHUNK_PREVIEW_CHARS: usize = 200;

/// Maximum characters of a query quoted in a recommendation.
pub const QUERY_PREVIEW_CHARS: usize = 50;

/// Number of unanswered queries quoted in a recommendation.
pub const UNANSWERED_PREVIEW_COUNT: usize = 3;

/// Queries beyond this count are dropped by page-level analysis.
pub const MAX_PAGE_QUERIES: usize = 10;

/// Coverage thresholds (percent) used by the recommendation rules.
pub const LOW_COVERAGE_PERCENT: f32 = 50.0;
pub const GOOD_COVERAGE_PERCENT: f32 = 60.0;
pub const EXCELLENT_COVERAGE_PERCENT: f32 = 80.0;

/// Truncates `text` to at most `max_chars` characters (not bytes).
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Truncates `text` to at most `max_chars` characters, marking the cut with `...`.
pub fn preview(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let keep = max_chars.saturating_sub(3);
    format!("{}...", truncate_chars(text, keep))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_chars_short_input_unchanged() {
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("", 10), "");
    }

    #[test]
    fn test_truncate_chars_exact_length() {
        assert_eq!(truncate_chars("abcde", 5), "abcde");
    }

    #[test]
    fn test_truncate_chars_respects_char_boundaries() {
        let text = "héllo wörld";
        assert_eq!(truncate_chars(text, 2), "hé");
        assert_eq!(truncate_chars(text, 8), "héllo wö");
    }

    #[test]
    fn test_preview_adds_ellipsis_within_budget() {
        let long = "x".repeat(250);
        let p = preview(&long, CHUNK_PREVIEW_CHARS);
        assert_eq!(p.chars().count(), CHUNK_PREVIEW_CHARS);
        assert!(p.ends_with("..."));
    }

    #[test]
    fn test_preview_short_text_unchanged() {
        assert_eq!(preview("short text", CHUNK_PREVIEW_CHARS), "short text");
    }

    #[test]
    fn test_threshold_ordering() {
        assert!(MIN_MATCH_SCORE < ANSWERED_THRESHOLD);
        assert!(LOW_COVERAGE_PERCENT < GOOD_COVERAGE_PERCENT);
        assert!(GOOD_COVERAGE_PERCENT < EXCELLENT_COVERAGE_PERCENT);
    }
}

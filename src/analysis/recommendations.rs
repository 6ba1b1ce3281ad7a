//! Human-readable advice derived from the verdicts.

use super::types::QueryVerdict;
use crate::constants::{
    EXCELLENT_COVERAGE_PERCENT, GOOD_COVERAGE_PERCENT, LOW_COVERAGE_PERCENT, QUERY_PREVIEW_CHARS,
    UNANSWERED_PREVIEW_COUNT, WEAK_CONFIDENCE_THRESHOLD, truncate_chars,
};

pub const NO_CONTENT_MESSAGE: &str = "No meaningful content found for analysis";

const EXCELLENT_COVERAGE_MESSAGE: &str =
    "Excellent content coverage! Consider adding FAQ schema markup for better AEO performance.";
const GOOD_COVERAGE_MESSAGE: &str =
    "Good content coverage. Focus on improving answer clarity and adding structured data.";

/// Builds the recommendation list, in a fixed order.
pub fn recommend(verdicts: &[QueryVerdict], coverage_percent: f32) -> Vec<String> {
    let mut recommendations = Vec::new();

    let unanswered: Vec<&QueryVerdict> = verdicts.iter().filter(|v| !v.is_answered).collect();
    let weak = verdicts
        .iter()
        .filter(|v| v.is_answered && v.confidence < WEAK_CONFIDENCE_THRESHOLD)
        .count();

    if coverage_percent < LOW_COVERAGE_PERCENT {
        recommendations.push(format!(
            "Low content coverage ({coverage_percent:.1}%). Add more comprehensive content addressing user questions."
        ));
    }

    if !unanswered.is_empty() {
        let examples: Vec<&str> = unanswered
            .iter()
            .take(UNANSWERED_PREVIEW_COUNT)
            .map(|v| truncate_chars(&v.query, QUERY_PREVIEW_CHARS))
            .collect();
        recommendations.push(format!(
            "{} queries have no relevant content. Consider adding FAQ sections or detailed explanations for: {}",
            unanswered.len(),
            examples.join(", ")
        ));
    }

    if weak > 0 {
        recommendations.push(format!(
            "{weak} queries have weak matches. Improve content clarity and directness for better answer engine optimization."
        ));
    }

    if coverage_percent >= EXCELLENT_COVERAGE_PERCENT {
        recommendations.push(EXCELLENT_COVERAGE_MESSAGE.to_string());
    } else if coverage_percent >= GOOD_COVERAGE_PERCENT {
        recommendations.push(GOOD_COVERAGE_MESSAGE.to_string());
    }

    recommendations
}

use serde::{Deserialize, Serialize};

use crate::constants::MIN_CHUNK_CHARS;

/// Where a chunk came from in the source document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkKind {
    Heading,
    Paragraph,
    FaqQuestion,
    FaqAnswer,
    #[default]
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// A fragment of document text to score queries against.
pub struct ContentChunk {
    pub text: String,
    #[serde(default, rename = "type", alias = "kind")]
    pub kind: ChunkKind,
}

impl ContentChunk {
    pub fn new(text: impl Into<String>, kind: ChunkKind) -> Self {
        Self {
            text: text.into(),
            kind,
        }
    }

    /// Returns `true` if the trimmed text is long enough to analyze.
    pub fn is_meaningful(&self) -> bool {
        self.text.trim().chars().count() > MIN_CHUNK_CHARS
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// One chunk's similarity to a query.
pub struct ChunkMatch {
    /// Position among the analyzed (filtered) chunks.
    pub index: usize,
    /// Preview of the chunk text.
    pub content: String,
    #[serde(rename = "type")]
    pub kind: ChunkKind,
    pub score: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// How well the document answers a single query.
pub struct QueryVerdict {
    pub query: String,
    pub is_answered: bool,
    /// `max_similarity * 2`, clamped to `[0, 1]`.
    pub confidence: f32,
    pub max_similarity: f32,
    pub best_match: Option<ChunkMatch>,
    /// Up to three strongest matches above the minimum score.
    pub top_matches: Vec<ChunkMatch>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisMetadata {
    pub queries_processed: usize,
    pub chunks_analyzed: usize,
    pub model_used: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
/// Aggregate relevance of a document for a set of queries.
pub struct RelevanceReport {
    /// Mean confidence as a percentage.
    pub overall_score: f32,
    /// Share of answered queries as a percentage.
    pub coverage_percent: f32,
    pub answered_count: usize,
    pub total_queries: usize,
    pub verdicts: Vec<QueryVerdict>,
    pub recommendations: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<AnalysisMetadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RelevanceReport {
    /// All-zero report with no verdicts.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Zero report carrying a single recommendation.
    pub fn with_recommendation(message: impl Into<String>) -> Self {
        Self {
            recommendations: vec![message.into()],
            ..Self::default()
        }
    }

    /// Zero report describing a failed analysis.
    pub fn failed(message: &str) -> Self {
        Self {
            recommendations: vec![format!("Analysis failed: {message}")],
            error: Some(message.to_string()),
            ..Self::default()
        }
    }
}

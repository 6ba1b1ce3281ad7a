use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, error, info, warn};

use super::error::AnalysisError;
use super::outcome::AnalysisOutcome;
use super::page::PageContent;
use super::recommendations::{NO_CONTENT_MESSAGE, recommend};
use super::types::{AnalysisMetadata, ChunkMatch, ContentChunk, QueryVerdict, RelevanceReport};
use crate::constants::{
    ANSWERED_THRESHOLD, CHUNK_PREVIEW_CHARS, CONFIDENCE_SCALE, MAX_PAGE_QUERIES, MIN_MATCH_SCORE,
    TOP_MATCHES, preview,
};
use crate::gateway::{EmbedderGateway, clean_inputs};
use crate::hashing::hash_identifier;
use crate::similarity::{SimilarityMatrix, argmax, top_k};

/// Scores how well a set of chunks answers a set of queries.
#[derive(Debug, Clone)]
pub struct RelevanceAnalyzer {
    gateway: Arc<EmbedderGateway>,
}

impl RelevanceAnalyzer {
    pub fn new(gateway: Arc<EmbedderGateway>) -> Self {
        Self { gateway }
    }

    pub fn gateway(&self) -> &Arc<EmbedderGateway> {
        &self.gateway
    }

    /// Analyzes `chunks` against `queries` on behalf of `identifier`.
    ///
    /// Never fails: empty inputs produce a zero report and embedding failures produce
    /// [`AnalysisOutcome::Degraded`].
    pub async fn analyze(
        &self,
        queries: &[String],
        chunks: &[ContentChunk],
        identifier: &str,
    ) -> AnalysisOutcome {
        let queries = clean_inputs(queries);
        if queries.is_empty() || chunks.is_empty() {
            debug!(
                queries = queries.len(),
                chunks = chunks.len(),
                "Nothing to analyze"
            );
            return AnalysisOutcome::Complete(RelevanceReport::empty());
        }

        let usable: Vec<&ContentChunk> = chunks.iter().filter(|c| c.is_meaningful()).collect();
        if usable.is_empty() {
            debug!(chunks = chunks.len(), "No chunk long enough to analyze");
            return AnalysisOutcome::Complete(RelevanceReport::with_recommendation(
                NO_CONTENT_MESSAGE,
            ));
        }

        let started = Instant::now();
        info!(
            queries = queries.len(),
            chunks = usable.len(),
            "Starting relevance analysis"
        );

        match self.score(&queries, &usable, identifier).await {
            Ok(report) => {
                info!(
                    overall_score = report.overall_score,
                    coverage_percent = report.coverage_percent,
                    answered = report.answered_count,
                    total = report.total_queries,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Relevance analysis complete"
                );
                AnalysisOutcome::Complete(report)
            }
            Err(err) => {
                error!(
                    caller = hash_identifier(identifier),
                    error = %err,
                    "Relevance analysis degraded"
                );
                AnalysisOutcome::degraded(err)
            }
        }
    }

    /// Analyzes a page: keeps the first [`MAX_PAGE_QUERIES`] queries and chunks the page with
    /// [`PageContent::to_chunks`].
    pub async fn analyze_page(
        &self,
        page: &PageContent,
        queries: &[String],
        identifier: &str,
    ) -> AnalysisOutcome {
        let queries = if queries.len() > MAX_PAGE_QUERIES {
            warn!(
                queries = queries.len(),
                limit = MAX_PAGE_QUERIES,
                "Too many queries, truncating"
            );
            &queries[..MAX_PAGE_QUERIES]
        } else {
            queries
        };

        let chunks = page.to_chunks();
        self.analyze(queries, &chunks, identifier).await
    }

    async fn score(
        &self,
        queries: &[String],
        chunks: &[&ContentChunk],
        identifier: &str,
    ) -> Result<RelevanceReport, AnalysisError> {
        let texts: Vec<String> = chunks.iter().map(|c| c.text.trim().to_string()).collect();

        let query_vectors = self.gateway.encode(queries, identifier).await?;
        let chunk_vectors = self.gateway.encode(&texts, identifier).await?;

        if query_vectors.len() != queries.len() {
            return Err(AnalysisError::VectorCountMismatch {
                side: "query",
                expected: queries.len(),
                actual: query_vectors.len(),
            });
        }
        if chunk_vectors.len() != chunks.len() {
            return Err(AnalysisError::VectorCountMismatch {
                side: "chunk",
                expected: chunks.len(),
                actual: chunk_vectors.len(),
            });
        }

        let matrix = SimilarityMatrix::compute(&query_vectors, &chunk_vectors);
        let verdicts: Vec<QueryVerdict> = queries
            .iter()
            .enumerate()
            .map(|(i, query)| verdict_for(query, matrix.row(i).unwrap_or_default(), chunks))
            .collect();

        let total_queries = verdicts.len();
        let answered_count = verdicts.iter().filter(|v| v.is_answered).count();
        let confidence_sum: f32 = verdicts.iter().map(|v| v.confidence).sum();
        let overall_score = 100.0 * confidence_sum / total_queries as f32;
        let coverage_percent = 100.0 * answered_count as f32 / total_queries as f32;

        let recommendations = recommend(&verdicts, coverage_percent);

        Ok(RelevanceReport {
            overall_score,
            coverage_percent,
            answered_count,
            total_queries,
            verdicts,
            recommendations,
            metadata: Some(AnalysisMetadata {
                queries_processed: total_queries,
                chunks_analyzed: chunks.len(),
                model_used: self.gateway.model_name(),
            }),
            error: None,
        })
    }
}

fn chunk_match(index: usize, score: f32, chunks: &[&ContentChunk]) -> Option<ChunkMatch> {
    chunks.get(index).map(|chunk| ChunkMatch {
        index,
        content: preview(&chunk.text, CHUNK_PREVIEW_CHARS),
        kind: chunk.kind,
        score,
    })
}

pub(super) fn verdict_for(query: &str, row: &[f32], chunks: &[&ContentChunk]) -> QueryVerdict {
    let best_index = argmax(row);
    let max_similarity = best_index.map_or(0.0, |i| row[i]);

    QueryVerdict {
        query: query.to_string(),
        is_answered: max_similarity > ANSWERED_THRESHOLD,
        confidence: (max_similarity * CONFIDENCE_SCALE).clamp(0.0, 1.0),
        max_similarity,
        best_match: best_index.and_then(|i| chunk_match(i, row[i], chunks)),
        top_matches: top_k(row, TOP_MATCHES, MIN_MATCH_SCORE)
            .into_iter()
            .filter_map(|(i, score)| chunk_match(i, score, chunks))
            .collect(),
    }
}

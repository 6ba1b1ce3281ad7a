//! Query-by-query relevance verdicts and the aggregate report.
//!
//! [`RelevanceAnalyzer::analyze`] cleans the queries, drops chunks too short to carry meaning,
//! encodes both sides through the [`EmbedderGateway`](crate::gateway::EmbedderGateway), and
//! turns the similarity matrix into verdicts, scores and recommendations.
//!
//! A query is answered when its best chunk similarity is above
//! [`ANSWERED_THRESHOLD`](crate::constants::ANSWERED_THRESHOLD). Embedding failures never
//! escape: they become [`AnalysisOutcome::Degraded`] with a zero report.

mod analyzer;
mod error;
mod outcome;
pub mod page;
pub mod recommendations;
mod types;


pub use analyzer::RelevanceAnalyzer;
pub use error::AnalysisError;
pub use outcome::{AnalysisOutcome, DEGRADED_STATUS};
pub use page::{FaqPair, PageContent};
pub use recommendations::NO_CONTENT_MESSAGE;
pub use types::{
    AnalysisMetadata, ChunkKind, ChunkMatch, ContentChunk, QueryVerdict, RelevanceReport,
};

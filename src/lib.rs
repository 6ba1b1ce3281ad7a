//! Semantic content-relevance scoring (used by the `relevance` binary and integration tests).
//!
//! Given natural-language queries and text chunks extracted from a document, the engine decides
//! which queries the document answers and produces an aggregate score with actionable gaps.
//!
//! # Public API Surface
//!
//! ## Analysis
//! - [`RelevanceAnalyzer`] - Query verdicts, coverage and recommendations
//! - [`AnalysisOutcome`], [`RelevanceReport`] - Result types (failures degrade, never error)
//! - [`ContentChunk`], [`PageContent`] - Inputs
//!
//! ## Embedding Orchestration
//! - [`EmbedderGateway`], [`GatewayConfig`] - Rate limiting, caching, lazy model load
//! - [`RateLimiter`] - Per-caller sliding window
//! - [`EmbeddingCache`] - FIFO batch cache
//!
//! ## Embedding Backends
//! - [`Embedder`], [`EmbedderFactory`] - The text-to-vector capability
//! - [`BertEmbedder`] - candle sentence-transformer
//! - [`StubEmbedder`] - Deterministic vectors without model files
//!
//! ## Utilities
//! - [`SimilarityMatrix`], [`cosine_similarity`] - Vector math
//! - [`Config`] - `RELEVANCE_*` environment configuration
//!
//! ## Test/Mock Support
//! Mock implementations are available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod analysis;
pub mod cache;
pub mod config;
pub mod constants;
pub mod embedding;
pub mod gateway;
pub mod hashing;
pub mod limiter;
pub mod similarity;

pub use analysis::{
    AnalysisError, AnalysisMetadata, AnalysisOutcome, ChunkKind, ChunkMatch, ContentChunk,
    DEGRADED_STATUS, FaqPair, NO_CONTENT_MESSAGE, PageContent, QueryVerdict, RelevanceAnalyzer,
    RelevanceReport,
};
pub use cache::{CacheStats, EmbeddingCache};
pub use config::{Config, ConfigError};
pub use embedding::{
    BertEmbedder, BertEmbedderConfig, DevicePreference, Embedder, EmbedderFactory, Embedding,
    EmbeddingError, STUB_EMBEDDING_DIM, StubEmbedder,
};
#[cfg(any(test, feature = "mock"))]
pub use embedding::{MockEmbedder, MockEmbedderFactory};
pub use gateway::{EmbedderGateway, GatewayConfig, GatewayError, GatewayState, clean_inputs};
pub use hashing::{BatchKey, hash_batch, hash_identifier, hash_to_u64};
pub use limiter::RateLimiter;
pub use similarity::{SimilarityMatrix, argmax, cosine_similarity, top_k};

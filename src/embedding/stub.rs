//! Deterministic embedder for tests and model-less runs.
//!
//! Each text seeds a linear congruential generator from its BLAKE3 fingerprint, so identical
//! texts always map to identical unit vectors and distinct texts are close to orthogonal. There is
//! no semantic signal: paraphrases do not score as similar.

use std::sync::Arc;

use tracing::debug;

use super::error::EmbeddingError;
use super::{Embedder, EmbedderFactory, Embedding, l2_normalize};
use crate::hashing::hash_to_u64;

/// Default stub dimension (matches all-MiniLM-L6-v2).
pub const STUB_EMBEDDING_DIM: usize = 384;

const STUB_MODEL_NAME: &str = "stub";

#[derive(Debug, Clone)]
pub struct StubEmbedder {
    embedding_dim: usize,
}

impl StubEmbedder {
    pub fn new() -> Self {
        Self::with_dim(STUB_EMBEDDING_DIM)
    }

    pub fn with_dim(embedding_dim: usize) -> Self {
        Self { embedding_dim }
    }

    /// Embeds a single text.
    pub fn embed_one(&self, text: &str) -> Embedding {
        let mut state = hash_to_u64(text.as_bytes());
        let mut embedding = Vec::with_capacity(self.embedding_dim);

        for _ in 0..self.embedding_dim {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
            let value = ((state >> 32) as f32 / u32::MAX as f32) * 2.0 - 1.0;
            embedding.push(value);
        }

        l2_normalize(&mut embedding);
        embedding
    }
}

impl Default for StubEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

impl Embedder for StubEmbedder {
    fn embed(&self, texts: &[String]) -> Result<Vec<Embedding>, EmbeddingError> {
        debug!(batch = texts.len(), "Generating stub embeddings");
        Ok(texts.iter().map(|text| self.embed_one(text)).collect())
    }

    fn embedding_dim(&self) -> usize {
        self.embedding_dim
    }

    fn model_name(&self) -> &str {
        STUB_MODEL_NAME
    }
}

impl EmbedderFactory for StubEmbedder {
    fn load(&self) -> Result<Arc<dyn Embedder>, EmbeddingError> {
        if self.embedding_dim == 0 {
            return Err(EmbeddingError::InvalidConfig {
                reason: "stub embedding_dim must be non-zero".to_string(),
            });
        }
        Ok(Arc::new(self.clone()))
    }

    fn model_name(&self) -> &str {
        STUB_MODEL_NAME
    }
}

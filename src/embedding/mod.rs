//! The embedding capability and its backends.
//!
//! - [`Embedder`] maps a batch of texts to fixed-dimension vectors.
//! - [`EmbedderFactory`] builds an embedder on demand; the gateway calls it lazily, off the
//!   async runtime, and retries it on failure.
//! - [`bert`] runs a sentence-transformer BERT model with candle.
//! - [`stub`] produces deterministic vectors without model files.

/// Sentence-transformer BERT backend.
pub mod bert;
/// BERT backend configuration.
pub mod config;
/// Device selection (CPU / Metal / CUDA).
pub mod device;
mod error;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
/// Deterministic hash-seeded embedder.
pub mod stub;


use std::sync::Arc;

pub use bert::BertEmbedder;
pub use config::{BertEmbedderConfig, DEFAULT_MAX_SEQ_LEN};
pub use device::DevicePreference;
pub use error::EmbeddingError;
#[cfg(any(test, feature = "mock"))]
pub use mock::{MockEmbedder, MockEmbedderFactory};
pub use stub::{STUB_EMBEDDING_DIM, StubEmbedder};

/// A dense embedding vector.
pub type Embedding = Vec<f32>;

/// Text-to-vector capability.
///
/// Implementations may block for a long time (model inference) and are always invoked from a
/// blocking worker, never directly on the async runtime. For a fixed model version the output
/// must be deterministic.
pub trait Embedder: Send + Sync {
    /// Embeds `texts`, returning exactly one vector per input, in order.
    fn embed(&self, texts: &[String]) -> Result<Vec<Embedding>, EmbeddingError>;

    /// Dimension of every returned vector.
    fn embedding_dim(&self) -> usize;

    /// Human-readable model identifier (reported in analysis metadata).
    fn model_name(&self) -> &str;
}

/// Builds an [`Embedder`]. Loading may be slow and may fail transiently.
pub trait EmbedderFactory: Send + Sync {
    /// Loads the embedding resource.
    fn load(&self) -> Result<Arc<dyn Embedder>, EmbeddingError>;

    /// Identifier of the model this factory loads.
    fn model_name(&self) -> &str;
}

/// Checks that `vectors` holds one vector per input, that all share `expected_dim` and that
/// every component is finite.
pub fn validate_batch(
    vectors: &[Embedding],
    expected_len: usize,
    expected_dim: usize,
) -> Result<(), EmbeddingError> {
    if vectors.len() != expected_len {
        return Err(EmbeddingError::BatchSizeMismatch {
            expected: expected_len,
            actual: vectors.len(),
        });
    }
    if let Some(bad) = vectors.iter().find(|v| v.len() != expected_dim) {
        return Err(EmbeddingError::DimensionMismatch {
            expected: expected_dim,
            actual: bad.len(),
        });
    }
    if let Some(index) = vectors
        .iter()
        .position(|v| v.iter().any(|x| !x.is_finite()))
    {
        return Err(EmbeddingError::NonFiniteValue { index });
    }
    Ok(())
}

/// Scales `embedding` to unit length in place (zero vectors are left untouched).
pub fn l2_normalize(embedding: &mut [f32]) {
    let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in embedding.iter_mut() {
            *x /= norm;
        }
    }
}

//! Bounded, insertion-ordered cache of embedding batches.
//!
//! Keys are [`BatchKey`](crate::hashing::BatchKey)s over the cleaned, ordered input batch; values
//! are immutable `Arc<[Embedding]>` slices shared with callers.

pub mod fifo;
pub mod types;


pub use fifo::EmbeddingCache;
pub use types::CacheStats;

//! FIFO-evicting embedding cache.
//!
//! When a new key arrives at a full cache, the oldest tenth of the entries (by insertion order,
//! at least one) is dropped in a single sweep. Hits do not refresh an entry's position.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use tracing::debug;

use super::types::CacheStats;
use crate::embedding::Embedding;
use crate::hashing::{BatchKey, hash_batch};

#[derive(Default)]
struct CacheInner {
    entries: HashMap<BatchKey, Arc<[Embedding]>>,
    order: VecDeque<BatchKey>,
}

/// In-memory batch cache keyed by [`hash_batch`].
pub struct EmbeddingCache {
    inner: Mutex<CacheInner>,
    capacity: usize,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl EmbeddingCache {
    /// Default maximum number of cached batches.
    pub const DEFAULT_CAPACITY: usize = 1000;

    /// Creates a cache with the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    /// Creates a cache holding at most `capacity` batches (`0` disables caching).
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(CacheInner::default()),
            capacity,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    /// Number of entries removed per eviction sweep.
    #[inline]
    pub fn eviction_batch(&self) -> usize {
        (self.capacity / 10).max(1)
    }

    /// Looks up a batch by key.
    pub fn get(&self, key: &BatchKey) -> Option<Arc<[Embedding]>> {
        let found = self.inner.lock().entries.get(key).cloned();
        match found {
            Some(_) => self.hits.fetch_add(1, Ordering::Relaxed),
            None => self.misses.fetch_add(1, Ordering::Relaxed),
        };
        found
    }

    /// Looks up a batch by hashing the texts with [`hash_batch`].
    pub fn get_batch<S: AsRef<str>>(&self, texts: &[S]) -> Option<Arc<[Embedding]>> {
        self.get(&hash_batch(texts))
    }

    /// Inserts a batch. Returns `false` (leaving the stored value untouched) if the key exists.
    pub fn put(&self, key: BatchKey, vectors: Arc<[Embedding]>) -> bool {
        if self.capacity == 0 {
            return false;
        }

        let mut inner = self.inner.lock();
        if inner.entries.contains_key(&key) {
            return false;
        }

        if inner.entries.len() >= self.capacity {
            let sweep = self.eviction_batch().min(inner.order.len());
            for _ in 0..sweep {
                if let Some(oldest) = inner.order.pop_front() {
                    inner.entries.remove(&oldest);
                }
            }
            self.evictions.fetch_add(sweep as u64, Ordering::Relaxed);
            debug!(
                evicted = sweep,
                remaining = inner.entries.len(),
                capacity = self.capacity,
                "Evicted oldest embedding batches"
            );
        }

        inner.entries.insert(key, vectors);
        inner.order.push_back(key);
        true
    }

    /// Inserts a batch keyed by hashing the texts with [`hash_batch`].
    pub fn put_batch<S: AsRef<str>>(&self, texts: &[S], vectors: Arc<[Embedding]>) -> bool {
        self.put(hash_batch(texts), vectors)
    }

    /// Returns `true` if the key is cached (does not count as a lookup).
    pub fn contains(&self, key: &BatchKey) -> bool {
        self.inner.lock().entries.contains_key(key)
    }

    /// Returns the number of cached batches.
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    /// Returns `true` if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the configured capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drops every entry. Counters are kept.
    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.entries.clear();
        inner.order.clear();
    }

    /// Returns a snapshot of size and hit/miss counters.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.len(),
            capacity: self.capacity,
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }
}

impl Default for EmbeddingCache {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EmbeddingCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddingCache")
            .field("entries", &self.len())
            .field("capacity", &self.capacity)
            .finish()
    }
}

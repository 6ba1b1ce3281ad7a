/// Point-in-time counters for an [`EmbeddingCache`](super::EmbeddingCache).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Entries currently stored.
    pub entries: usize,
    /// Maximum entries before eviction.
    pub capacity: usize,
    /// Lookups answered from the cache.
    pub hits: u64,
    /// Lookups that found nothing.
    pub misses: u64,
    /// Entries removed by FIFO eviction.
    pub evictions: u64,
}

impl CacheStats {
    /// Returns hits / (hits + misses), or `0.0` before any lookup.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

impl std::fmt::Display for CacheStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{} entries, {} hits, {} misses, {} evicted",
            self.entries, self.capacity, self.hits, self.misses, self.evictions
        )
    }
}

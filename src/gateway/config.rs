use std::time::Duration;

use crate::cache::EmbeddingCache;
use crate::config::Config;
use crate::limiter::{DEFAULT_MAX_CALLS, DEFAULT_WINDOW};

/// Default number of concurrent blocking embedder calls.
pub const DEFAULT_WORKER_POOL_SIZE: usize = 4;

/// Default number of embedder load attempts per initialization.
pub const DEFAULT_INIT_RETRY_COUNT: u32 = 3;

/// Default base delay between load attempts (doubled after each failure).
pub const DEFAULT_INIT_BACKOFF_BASE: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, PartialEq, Eq)]
/// Settings for [`EmbedderGateway`](super::EmbedderGateway).
pub struct GatewayConfig {
    /// Calls admitted per caller per window.
    pub max_calls: usize,
    /// Sliding rate-limit window.
    pub window: Duration,
    /// Cached batches kept before FIFO eviction.
    pub cache_capacity: usize,
    /// Concurrent blocking embedder calls (loads and encodes).
    pub worker_pool_size: usize,
    /// Load attempts per initialization sequence.
    pub init_retry_count: u32,
    /// Delay before the second attempt; doubles for each later one.
    pub init_backoff_base: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            max_calls: DEFAULT_MAX_CALLS,
            window: DEFAULT_WINDOW,
            cache_capacity: EmbeddingCache::DEFAULT_CAPACITY,
            worker_pool_size: DEFAULT_WORKER_POOL_SIZE,
            init_retry_count: DEFAULT_INIT_RETRY_COUNT,
            init_backoff_base: DEFAULT_INIT_BACKOFF_BASE,
        }
    }
}

impl GatewayConfig {
    pub fn with_rate_limit(mut self, max_calls: usize, window: Duration) -> Self {
        self.max_calls = max_calls;
        self.window = window;
        self
    }

    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    pub fn with_worker_pool_size(mut self, size: usize) -> Self {
        self.worker_pool_size = size;
        self
    }

    pub fn with_init_retries(mut self, count: u32, backoff_base: Duration) -> Self {
        self.init_retry_count = count;
        self.init_backoff_base = backoff_base;
        self
    }

    /// Delay after failed attempt `attempt` (zero-based): `base * 2^attempt`.
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        self.init_backoff_base
            .saturating_mul(1u32 << attempt.min(16))
    }
}

impl From<&Config> for GatewayConfig {
    fn from(config: &Config) -> Self {
        Self {
            max_calls: config.max_calls_per_window,
            window: Duration::from_secs(config.window_secs),
            cache_capacity: config.cache_capacity,
            worker_pool_size: config.worker_pool_size,
            init_retry_count: config.init_retry_count,
            init_backoff_base: config.init_backoff_base,
        }
    }
}

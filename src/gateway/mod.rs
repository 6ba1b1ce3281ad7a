//! Shared access to the embedder.
//!
//! [`EmbedderGateway`] owns everything callers share: the lazily loaded [`Embedder`], the
//! per-caller [`RateLimiter`], the batch [`EmbeddingCache`] and a bounded pool of blocking
//! workers. One gateway is created at startup and handed to every analyzer as an `Arc`.
//!
//! Initialization is single-flight. The first caller to find the embedder missing runs the load
//! sequence (with retries and exponential backoff); concurrent callers subscribe to a completion
//! signal and receive the same outcome. A failed sequence leaves the gateway in
//! [`GatewayState::Failed`] and the next call starts over.

mod config;
mod error;
mod state;


use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;
use tokio::sync::{Semaphore, watch};
use tracing::{debug, error, info, warn};

use crate::cache::EmbeddingCache;
use crate::constants::{MAX_INPUT_CHARS, truncate_chars};
use crate::embedding::{Embedder, EmbedderFactory, Embedding, EmbeddingError, validate_batch};
use crate::hashing::{hash_batch, hash_identifier};
use crate::limiter::RateLimiter;

pub use config::{
    DEFAULT_INIT_BACKOFF_BASE, DEFAULT_INIT_RETRY_COUNT, DEFAULT_WORKER_POOL_SIZE, GatewayConfig,
};
pub use error::{GatewayError, GatewayResult};
pub use state::GatewayState;

/// Trims each input, drops empty ones and caps the rest at [`MAX_INPUT_CHARS`].
pub fn clean_inputs<S: AsRef<str>>(texts: &[S]) -> Vec<String> {
    texts
        .iter()
        .map(|text| text.as_ref().trim())
        .filter(|text| !text.is_empty())
        .map(|text| truncate_chars(text, MAX_INPUT_CHARS).to_string())
        .collect()
}

#[derive(Debug, Clone)]
struct InitFailure {
    attempts: u32,
    reason: String,
}

impl From<InitFailure> for GatewayError {
    fn from(failure: InitFailure) -> Self {
        GatewayError::InitializationFailed {
            attempts: failure.attempts,
            reason: failure.reason,
        }
    }
}

type InitOutcome = Option<Result<Arc<dyn Embedder>, InitFailure>>;

enum Slot {
    Uninitialized,
    Initializing(watch::Receiver<InitOutcome>),
    Ready(Arc<dyn Embedder>),
    Failed,
}

enum InitRole {
    Leader(watch::Sender<InitOutcome>),
    Follower(watch::Receiver<InitOutcome>),
}

/// Publishes the outcome of a load sequence exactly once.
///
/// If the leading caller's future is dropped mid-sequence, the guard marks the gateway failed
/// and releases every waiter.
struct InitGuard<'a> {
    slot: &'a Mutex<Slot>,
    tx: Option<watch::Sender<InitOutcome>>,
}

impl InitGuard<'_> {
    fn complete(mut self, outcome: Result<Arc<dyn Embedder>, InitFailure>) {
        if let Some(tx) = self.tx.take() {
            Self::publish(self.slot, &tx, outcome);
        }
    }

    fn publish(
        slot: &Mutex<Slot>,
        tx: &watch::Sender<InitOutcome>,
        outcome: Result<Arc<dyn Embedder>, InitFailure>,
    ) {
        let mut slot = slot.lock();
        *slot = match &outcome {
            Ok(embedder) => Slot::Ready(Arc::clone(embedder)),
            Err(_) => Slot::Failed,
        };
        tx.send_replace(Some(outcome));
    }
}

impl Drop for InitGuard<'_> {
    fn drop(&mut self) {
        if let Some(tx) = self.tx.take() {
            warn!("Embedder initialization abandoned before completion");
            Self::publish(
                self.slot,
                &tx,
                Err(InitFailure {
                    attempts: 0,
                    reason: "initialization abandoned".to_string(),
                }),
            );
        }
    }
}

/// Rate-limited, cached, lazily initialized access to an [`Embedder`].
pub struct EmbedderGateway {
    factory: Arc<dyn EmbedderFactory>,
    config: GatewayConfig,
    limiter: RateLimiter,
    cache: EmbeddingCache,
    workers: Arc<Semaphore>,
    slot: Mutex<Slot>,
}

impl std::fmt::Debug for EmbedderGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbedderGateway")
            .field("model", &self.factory.model_name())
            .field("state", &self.state())
            .field("config", &self.config)
            .field("cache", &self.cache)
            .finish()
    }
}

impl EmbedderGateway {
    /// Creates a gateway; nothing is loaded until the first [`encode`](Self::encode) or
    /// [`warm_up`](Self::warm_up).
    ///
    /// A worker pool size or retry count of zero is raised to one.
    pub fn new(factory: Arc<dyn EmbedderFactory>, config: GatewayConfig) -> Self {
        let mut config = config;
        config.worker_pool_size = config.worker_pool_size.max(1);
        config.init_retry_count = config.init_retry_count.max(1);

        Self {
            factory,
            limiter: RateLimiter::new(config.max_calls, config.window),
            cache: EmbeddingCache::with_capacity(config.cache_capacity),
            workers: Arc::new(Semaphore::new(config.worker_pool_size)),
            slot: Mutex::new(Slot::Uninitialized),
            config,
        }
    }

    /// Creates a gateway with [`GatewayConfig::default`].
    pub fn with_defaults(factory: Arc<dyn EmbedderFactory>) -> Self {
        Self::new(factory, GatewayConfig::default())
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub fn cache(&self) -> &EmbeddingCache {
        &self.cache
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    pub fn state(&self) -> GatewayState {
        match &*self.slot.lock() {
            Slot::Uninitialized => GatewayState::Uninitialized,
            Slot::Initializing(_) => GatewayState::Initializing,
            Slot::Ready(_) => GatewayState::Ready,
            Slot::Failed => GatewayState::Failed,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.state() == GatewayState::Ready
    }

    /// Name of the loaded model, or of the model the factory would load.
    pub fn model_name(&self) -> String {
        match &*self.slot.lock() {
            Slot::Ready(embedder) => embedder.model_name().to_string(),
            _ => self.factory.model_name().to_string(),
        }
    }

    /// Loads the embedder if needed without encoding anything.
    pub async fn warm_up(&self) -> GatewayResult<()> {
        self.ensure_ready().await.map(|_| ())
    }

    /// Encodes `texts` on behalf of `identifier`.
    ///
    /// Inputs are trimmed, emptied entries dropped and each capped at [`MAX_INPUT_CHARS`]
    /// characters, so the result has one vector per surviving input. A batch with no
    /// surviving inputs returns an empty result without touching the cache or the model.
    pub async fn encode(
        &self,
        texts: &[String],
        identifier: &str,
    ) -> GatewayResult<Arc<[Embedding]>> {
        if let Err(retry_after) = self.limiter.try_acquire(identifier) {
            warn!(
                caller = hash_identifier(identifier),
                retry_after_secs = retry_after.as_secs(),
                "Rate limit exceeded"
            );
            return Err(GatewayError::RateLimited {
                identifier: identifier.to_string(),
                retry_after,
            });
        }

        let embedder = self.ensure_ready().await?;

        let cleaned = clean_inputs(texts);
        if cleaned.is_empty() {
            return Ok(Arc::from(Vec::new()));
        }

        let key = hash_batch(&cleaned);
        if let Some(vectors) = self.cache.get(&key) {
            debug!(batch = cleaned.len(), "Embedding cache hit");
            return Ok(vectors);
        }

        let started = Instant::now();
        let batch = cleaned.len();
        let vectors: Arc<[Embedding]> = self.run_embed(embedder, cleaned).await?.into();
        self.cache.put(key, Arc::clone(&vectors));

        info!(
            batch,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Encoded batch"
        );
        Ok(vectors)
    }

    async fn ensure_ready(&self) -> GatewayResult<Arc<dyn Embedder>> {
        let role = {
            let mut slot = self.slot.lock();
            match &*slot {
                Slot::Ready(embedder) => return Ok(Arc::clone(embedder)),
                Slot::Initializing(rx) => InitRole::Follower(rx.clone()),
                Slot::Uninitialized | Slot::Failed => {
                    let (tx, rx) = watch::channel(None);
                    *slot = Slot::Initializing(rx);
                    InitRole::Leader(tx)
                }
            }
        };

        match role {
            InitRole::Leader(tx) => self.initialize(tx).await,
            InitRole::Follower(rx) => Self::wait_for_init(rx).await,
        }
    }

    async fn wait_for_init(
        mut rx: watch::Receiver<InitOutcome>,
    ) -> GatewayResult<Arc<dyn Embedder>> {
        let outcome = rx
            .wait_for(Option::is_some)
            .await
            .map(|value| value.clone())
            .ok()
            .flatten();

        match outcome {
            Some(Ok(embedder)) => Ok(embedder),
            Some(Err(failure)) => Err(failure.into()),
            None => Err(GatewayError::InitializationFailed {
                attempts: 0,
                reason: "initialization abandoned".to_string(),
            }),
        }
    }

    async fn initialize(
        &self,
        tx: watch::Sender<InitOutcome>,
    ) -> GatewayResult<Arc<dyn Embedder>> {
        let guard = InitGuard {
            slot: &self.slot,
            tx: Some(tx),
        };

        let attempts = self.config.init_retry_count;
        let mut last_reason = String::new();

        for attempt in 0..attempts {
            let started = Instant::now();
            match self.load_once().await {
                Ok(embedder) => {
                    info!(
                        model = embedder.model_name(),
                        embedding_dim = embedder.embedding_dim(),
                        attempt = attempt + 1,
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "Embedder ready"
                    );
                    guard.complete(Ok(Arc::clone(&embedder)));
                    return Ok(embedder);
                }
                Err(reason) => {
                    warn!(
                        attempt = attempt + 1,
                        max_attempts = attempts,
                        error = %reason,
                        "Embedder load attempt failed"
                    );
                    last_reason = reason;
                    if attempt + 1 < attempts {
                        tokio::time::sleep(self.config.backoff_for(attempt)).await;
                    }
                }
            }
        }

        error!(attempts, error = %last_reason, "Embedder initialization failed");
        let failure = InitFailure {
            attempts,
            reason: last_reason,
        };
        guard.complete(Err(failure.clone()));
        Err(failure.into())
    }

    async fn load_once(&self) -> Result<Arc<dyn Embedder>, String> {
        let permit = Arc::clone(&self.workers)
            .acquire_owned()
            .await
            .map_err(|e| format!("worker pool closed: {e}"))?;
        let factory = Arc::clone(&self.factory);

        tokio::task::spawn_blocking(move || {
            let _permit = permit;
            factory.load()
        })
        .await
        .map_err(|e| format!("load task failed: {e}"))?
        .map_err(|e| e.to_string())
    }

    async fn run_embed(
        &self,
        embedder: Arc<dyn Embedder>,
        texts: Vec<String>,
    ) -> GatewayResult<Vec<Embedding>> {
        let permit = Arc::clone(&self.workers)
            .acquire_owned()
            .await
            .map_err(|e| GatewayError::EncodingFailed {
                reason: format!("worker pool closed: {e}"),
            })?;

        let result = tokio::task::spawn_blocking(move || -> Result<_, EmbeddingError> {
            let _permit = permit;
            let vectors = embedder.embed(&texts)?;
            validate_batch(&vectors, texts.len(), embedder.embedding_dim())?;
            Ok(vectors)
        })
        .await
        .map_err(|e| GatewayError::EncodingFailed {
            reason: format!("encode task failed: {e}"),
        })?;

        result.map_err(|e| {
            warn!(error = %e, "Embedding batch failed");
            GatewayError::EncodingFailed {
                reason: e.to_string(),
            }
        })
    }
}

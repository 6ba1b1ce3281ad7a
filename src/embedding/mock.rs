//! Instrumented embedder and factory for tests.
//!
//! [`MockEmbedder`] counts calls, records every batch it sees, can return scripted vectors for
//! specific texts, and can be switched into a failing mode. [`MockEmbedderFactory`] counts loads
//! and can fail a configurable number of times before succeeding.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use parking_lot::Mutex;

use super::error::EmbeddingError;
use super::stub::StubEmbedder;
use super::{Embedder, EmbedderFactory, Embedding};

const MOCK_MODEL_NAME: &str = "mock-embedder";

pub struct MockEmbedder {
    fallback: StubEmbedder,
    scripted: Mutex<HashMap<String, Embedding>>,
    calls: AtomicUsize,
    batches: Mutex<Vec<Vec<String>>>,
    failing: AtomicBool,
    delay: Mutex<Option<Duration>>,
}

impl MockEmbedder {
    pub fn new(embedding_dim: usize) -> Self {
        Self {
            fallback: StubEmbedder::with_dim(embedding_dim),
            scripted: Mutex::new(HashMap::new()),
            calls: AtomicUsize::new(0),
            batches: Mutex::new(Vec::new()),
            failing: AtomicBool::new(false),
            delay: Mutex::new(None),
        }
    }

    /// Returns `vector` whenever `text` is embedded (other texts fall back to stub vectors).
    pub fn with_vector(self, text: &str, vector: Embedding) -> Self {
        self.set_vector(text, vector);
        self
    }

    pub fn set_vector(&self, text: &str, vector: Embedding) {
        self.scripted.lock().insert(text.to_string(), vector);
    }

    /// Makes every subsequent `embed` call fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Sleeps for `delay` inside every `embed` call.
    pub fn set_delay(&self, delay: Option<Duration>) {
        *self.delay.lock() = delay;
    }

    /// Number of `embed` calls, including failed ones.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Every batch passed to `embed`, in call order.
    pub fn batches(&self) -> Vec<Vec<String>> {
        self.batches.lock().clone()
    }
}

impl Embedder for MockEmbedder {
    fn embed(&self, texts: &[String]) -> Result<Vec<Embedding>, EmbeddingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.batches.lock().push(texts.to_vec());

        let delay = *self.delay.lock();
        if let Some(delay) = delay {
            std::thread::sleep(delay);
        }

        if self.failing.load(Ordering::SeqCst) {
            return Err(EmbeddingError::InferenceFailed {
                reason: "mock embedder configured to fail".to_string(),
            });
        }

        let scripted = self.scripted.lock();
        Ok(texts
            .iter()
            .map(|text| {
                scripted
                    .get(text)
                    .cloned()
                    .unwrap_or_else(|| self.fallback.embed_one(text))
            })
            .collect())
    }

    fn embedding_dim(&self) -> usize {
        Embedder::embedding_dim(&self.fallback)
    }

    fn model_name(&self) -> &str {
        MOCK_MODEL_NAME
    }
}

/// Factory handing out a shared [`MockEmbedder`].
pub struct MockEmbedderFactory {
    embedder: Arc<MockEmbedder>,
    loads: AtomicUsize,
    failures_remaining: AtomicUsize,
    load_delay: Mutex<Option<Duration>>,
}

impl MockEmbedderFactory {
    pub fn new(embedder: Arc<MockEmbedder>) -> Self {
        Self {
            embedder,
            loads: AtomicUsize::new(0),
            failures_remaining: AtomicUsize::new(0),
            load_delay: Mutex::new(None),
        }
    }

    /// Fails the next `count` load attempts.
    pub fn fail_next(&self, count: usize) {
        self.failures_remaining.store(count, Ordering::SeqCst);
    }

    /// Sleeps for `delay` inside every load attempt.
    pub fn set_load_delay(&self, delay: Option<Duration>) {
        *self.load_delay.lock() = delay;
    }

    /// Number of load attempts, including failed ones.
    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    pub fn embedder(&self) -> &Arc<MockEmbedder> {
        &self.embedder
    }
}

impl EmbedderFactory for MockEmbedderFactory {
    fn load(&self) -> Result<Arc<dyn Embedder>, EmbeddingError> {
        let attempt = self.loads.fetch_add(1, Ordering::SeqCst) + 1;

        let delay = *self.load_delay.lock();
        if let Some(delay) = delay {
            std::thread::sleep(delay);
        }

        let failing = self
            .failures_remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(EmbeddingError::ModelLoadFailed {
                reason: format!("mock load failure on attempt {attempt}"),
            });
        }

        Ok(Arc::clone(&self.embedder) as Arc<dyn Embedder>)
    }

    fn model_name(&self) -> &str {
        MOCK_MODEL_NAME
    }
}

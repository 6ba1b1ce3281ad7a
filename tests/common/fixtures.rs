//! Shared builders for integration tests.

use std::sync::Arc;
use std::time::Duration;

use relevance::embedding::{MockEmbedder, MockEmbedderFactory};
use relevance::{ChunkKind, ContentChunk, EmbedderGateway, GatewayConfig, RelevanceAnalyzer};

pub const DIM: usize = 4;

pub const AXIS_X: [f32; DIM] = [1.0, 0.0, 0.0, 0.0];
pub const AXIS_Y: [f32; DIM] = [0.0, 1.0, 0.0, 0.0];

/// Gateway config with millisecond init backoff.
pub fn fast_config() -> GatewayConfig {
    GatewayConfig::default().with_init_retries(3, Duration::from_millis(1))
}

pub struct MockStack {
    pub factory: Arc<MockEmbedderFactory>,
    pub gateway: Arc<EmbedderGateway>,
    pub analyzer: RelevanceAnalyzer,
}

impl MockStack {
    pub fn new(mock: MockEmbedder, config: GatewayConfig) -> Self {
        let factory = Arc::new(MockEmbedderFactory::new(Arc::new(mock)));
        let gateway = Arc::new(EmbedderGateway::new(factory.clone(), config));
        let analyzer = RelevanceAnalyzer::new(Arc::clone(&gateway));
        Self {
            factory,
            gateway,
            analyzer,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(MockEmbedder::new(DIM), fast_config())
    }

    pub fn mock(&self) -> &MockEmbedder {
        self.factory.embedder()
    }
}

pub fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

pub fn chunk(text: &str, kind: ChunkKind) -> ContentChunk {
    ContentChunk::new(text, kind)
}

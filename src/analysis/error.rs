use thiserror::Error;

use crate::gateway::GatewayError;

#[derive(Debug, Clone, Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("embedder returned {actual} {side} vectors, expected {expected}")]
    VectorCountMismatch {
        side: &'static str,
        expected: usize,
        actual: usize,
    },
}

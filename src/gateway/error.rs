use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    #[error("rate limit exceeded, retry after {}s", retry_after.as_secs())]
    RateLimited {
        identifier: String,
        retry_after: Duration,
    },

    #[error("embedder initialization failed after {attempts} attempts: {reason}")]
    InitializationFailed { attempts: u32, reason: String },

    #[error("encoding failed: {reason}")]
    EncodingFailed { reason: String },
}

impl GatewayError {
    /// Returns `true` for rate-limit denials.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, GatewayError::RateLimited { .. })
    }
}

pub type GatewayResult<T> = Result<T, GatewayError>;

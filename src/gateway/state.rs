use std::fmt;

/// Lifecycle of the gateway's embedder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayState {
    /// Nothing has requested the embedder yet.
    Uninitialized,
    /// A caller is running the load sequence; others wait for it.
    Initializing,
    /// The embedder is loaded and shared by all callers.
    Ready,
    /// The last load sequence failed; the next call starts a new one.
    Failed,
}

impl GatewayState {
    pub fn as_str(&self) -> &'static str {
        match self {
            GatewayState::Uninitialized => "uninitialized",
            GatewayState::Initializing => "initializing",
            GatewayState::Ready => "ready",
            GatewayState::Failed => "failed",
        }
    }
}

impl fmt::Display for GatewayState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

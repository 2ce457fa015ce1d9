use std::fmt;

/// Lifecycle of a [`crate::SecurityClient`].
///
/// ```text
/// Uninitialized -> Initializing -> Ready -> ShuttingDown -> Shutdown
///                       |
///                       +-> Failed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClientState {
    Uninitialized,
    Initializing,
    Ready,
    ShuttingDown,
    Shutdown,
    /// Initialization reached the engine and failed. Not restartable.
    Failed,
}

impl ClientState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Initializing => "initializing",
            Self::Ready => "ready",
            Self::ShuttingDown => "shutting-down",
            Self::Shutdown => "shutdown",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for ClientState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

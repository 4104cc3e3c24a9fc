//! Error types for plugin discovery and instantiation.

use thiserror::Error;

/// Stage at which instantiation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstantiateStage {
    Lookup,
    Creation,
    Activation,
}

impl std::fmt::Display for InstantiateStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InstantiateStage::Lookup => write!(f, "component lookup"),
            InstantiateStage::Creation => write!(f, "instance creation"),
            InstantiateStage::Activation => write!(f, "activation"),
        }
    }
}

/// Non-fatal directory failures; the cached list stays valid.
#[derive(Error, Debug)]
pub enum DirectoryError {
    #[error("component query failed: {0}")]
    QueryFailed(String),
}

/// Instantiation failures. None of these have graph-side effects.
#[derive(Error, Debug)]
pub enum InstantiateError {
    #[error("unknown component: {0}")]
    UnknownComponent(String),

    #[error("instantiation failed at {stage}: {reason}")]
    Failed {
        stage: InstantiateStage,
        reason: String,
    },

    #[error("timeout after {duration_ms}ms instantiating '{name}'")]
    Timeout { name: String, duration_ms: u64 },
}

//! Error types for solista-core.

use crate::format::StreamFormat;
use crate::graph::NodeId;
use thiserror::Error;

/// Error type for graph and engine operations.
///
/// Structural errors (`DuplicateAttach`, `NotAttached`, `DetachWhileConnected`,
/// `Format`, `FixedNode`) are logic errors: the failed call leaves the graph
/// in its previous consistent state, never partially mutated.
#[derive(Error, Debug)]
pub enum Error {
    #[error("{0} is already attached")]
    DuplicateAttach(NodeId),

    #[error("{0} is not attached")]
    NotAttached(NodeId),

    #[error("{node} still has {connections} connection(s); disconnect before detach")]
    DetachWhileConnected { node: NodeId, connections: usize },

    #[error("{0} is a fixed engine node")]
    FixedNode(NodeId),

    #[error("unsupported stream format: {0}")]
    Format(StreamFormat),

    #[error("audio engine failed to start: {0}")]
    EngineStart(String),

    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

/// Result type alias.
pub type Result<T> = std::result::Result<T, Error>;

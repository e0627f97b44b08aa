//! Graph-subsystem error type.

use thiserror::Error;

use lr_core::NodeId;

/// Errors produced by `lr-graph`.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("node {0} not found in graph")]
    NodeNotFound(NodeId),

    #[error("no edge from {from} to {to}")]
    EdgeNotFound { from: NodeId, to: NodeId },

    #[error("rating {0} is outside 0..=5")]
    RatingOutOfRange(f32),

    #[error("graph parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type GraphResult<T> = Result<T, GraphError>;

//! Routing and codec error types.

use thiserror::Error;

use lr_core::{ConfigError, GeoPoint, NodeId};
use lr_graph::GraphError;
use lr_spatial::SpatialError;

/// Failures of the path-tag codec.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TagError {
    #[error("cannot encode an empty path")]
    EmptyPath,

    #[error("tag is not valid base64")]
    Corrupt,

    #[error("tag starts at unknown node {0}")]
    UnknownNode(u64),

    #[error("{from} and {to} are not adjacent")]
    NotAdjacent { from: NodeId, to: NodeId },

    #[error("{node} has no connection number {index}")]
    ConnectionOutOfRange { node: NodeId, index: u32 },

    #[error("connection number {index} at {node} does not fit in one digit")]
    TooManyConnections { node: NodeId, index: usize },
}

pub type TagResult<T> = Result<T, TagError>;

/// Errors surfaced to callers of the route engine.
#[derive(Debug, Error)]
pub enum RoutingError {
    #[error("no road near {0}")]
    NoNearbyEdge(GeoPoint),

    #[error("no route matched the length window after {attempts} attempts")]
    NoRoute { attempts: usize },

    #[error("position is not on the given route")]
    NotOnRoute,

    #[error("rating {0} is outside 0..=5")]
    RatingOutOfRange(f32),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("bad route tag: {0}")]
    Tag(#[from] TagError),

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Spatial(#[from] SpatialError),

    #[error("worker pool error: {0}")]
    Pool(String),
}

pub type RoutingResult<T> = Result<T, RoutingError>;

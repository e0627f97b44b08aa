//! Spatial-index error type.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SpatialError {
    #[error("cell size must be positive and finite, got {0}")]
    InvalidCellSize(f64),

    #[error("bounds are not finite")]
    InvalidBounds,
}

pub type SpatialResult<T> = Result<T, SpatialError>;

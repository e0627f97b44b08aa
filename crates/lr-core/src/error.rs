//! Configuration error type.

use thiserror::Error;

/// Errors raised while reading or validating routing parameters.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("invalid value {value:?} for parameter {key:?}")]
    InvalidValue { key: String, value: String },

    #[error("inconsistent configuration: {0}")]
    Inconsistent(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

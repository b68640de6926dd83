//! Error types for fabula-registry

use thiserror::Error;

/// Registry error type
///
/// Only registration-time misuse is a hard error; resolution failures
/// during normal operation are returned as data (see `resolve`).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("invalid version string: {0:?}")]
    InvalidVersion(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

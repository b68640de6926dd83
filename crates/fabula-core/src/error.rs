//! Error types for fabula-core

use crate::{EdgeId, NodeId};
use thiserror::Error;

/// Core error type
///
/// These are the hard errors of the engine: caller misuse of the
/// executor's transition API. Degraded-but-valid situations (failed
/// condition evaluation, validation findings) are returned as data
/// instead, never as an `Err`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("story has already been started")]
    AlreadyStarted,

    #[error("story has not been started")]
    NotStarted,

    #[error("node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("edge {edge} is not available from node {node}")]
    EdgeNotAvailable { edge: EdgeId, node: NodeId },

    #[error("no default edge available from node {0}")]
    NoDefaultEdge(NodeId),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

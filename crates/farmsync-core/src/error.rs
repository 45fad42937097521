//! Error types for farmsync-core

use thiserror::Error;

use crate::gateway::RequestError;
use crate::records::ResourceKind;

/// Result type alias using farmsync-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in farmsync-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Gateway request failed (transport, server, or payload error)
    #[error(transparent)]
    Request(#[from] RequestError),

    /// Offline path attempted without a mirrored snapshot
    #[error("No {} data available offline", .0.label())]
    OfflineUnavailable(ResourceKind),

    /// Record not found
    #[error("{} not found: {id}", .kind.singular())]
    NotFound { kind: ResourceKind, id: String },

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// No access token is available for an authenticated call
    #[error("Not signed in")]
    NotAuthenticated,

    /// Local mirror storage error
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

//! Error types for glance-sync.

use thiserror::Error;

/// Errors that can occur in glance-sync operations.
#[derive(Debug, Error)]
pub enum SyncError {
    /// MessagePack serialization failed
    #[error("serialization failed: {0}")]
    Serialization(#[source] rmp_serde::encode::Error),

    /// MessagePack deserialization failed
    #[error("deserialization failed: {0}")]
    Deserialization(#[source] rmp_serde::decode::Error),

    /// Invalid data format
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// Connection error
    #[error("connection error: {0}")]
    Connection(String),

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),
}

//! Error types for seatwise-state

use thiserror::Error;

/// Errors that can occur in the snapshot persistence layer
#[derive(Error, Debug)]
pub enum StorageError {
    /// Underlying filesystem failure
    #[error("I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization failed: {0}")]
    Serialization(String),

    /// Deserialization error
    #[error("Deserialization failed: {0}")]
    Deserialization(String),

    /// Snapshot written by a newer schema than this build understands
    #[error("Unsupported snapshot schema version {found} (max supported {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },

    /// Digest string is not valid lowercase SHA-256 hex
    #[error("Invalid digest: {digest}")]
    InvalidDigest { digest: String },

    /// Background task running blocking I/O was cancelled or panicked
    #[error("Storage task failed: {0}")]
    Task(String),
}

impl From<tokio::task::JoinError> for StorageError {
    fn from(err: tokio::task::JoinError) -> Self {
        StorageError::Task(err.to_string())
    }
}

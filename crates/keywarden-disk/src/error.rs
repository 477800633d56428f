//! Error types for disk operations.

use thiserror::Error;

/// Result type for disk operations.
pub type Result<T> = std::result::Result<T, DiskError>;

/// Errors from key staging and external disk tooling.
#[derive(Debug, Error)]
pub enum DiskError {
    /// Staging a key file failed.
    #[error("Key staging failed: {0}")]
    Staging(String),

    /// An external tool could not be started at all.
    #[error("Could not start '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// An external tool ran and reported failure.
    #[error("Command '{command}' failed with status {status}: {stderr}")]
    Tool {
        command: String,
        status: i32,
        stderr: String,
    },

    /// A block device never appeared for the given UUID.
    #[error("No device found for UUID '{uuid}'")]
    DeviceNotFound { uuid: String },

    /// Filesystem error outside the staging fast path.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DiskError {
    /// Create a staging error with a message.
    pub fn staging(message: impl Into<String>) -> Self {
        Self::Staging(message.into())
    }
}

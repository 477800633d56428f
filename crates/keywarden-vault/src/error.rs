//! Error types for store operations.

use thiserror::Error;

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, VaultError>;

/// Authentication error types.
///
/// Empty credentials are rejected before any request is sent, so each
/// emptiness case has its own variant rather than being folded into the
/// exchange failure.
#[derive(Debug, Error)]
pub enum AuthError {
    /// AppRole role_id is empty.
    #[error("AppRole role_id is empty")]
    EmptyRoleId,

    /// AppRole secret_id is empty.
    #[error("AppRole secret_id is empty")]
    EmptySecretId,

    /// Static token is empty.
    #[error("Store token is empty")]
    EmptyToken,

    /// The credential exchange was rejected or returned an unusable response.
    #[error("Credential exchange failed: {0}")]
    Exchange(String),
}

/// Store error types.
#[derive(Debug, Error)]
pub enum VaultError {
    /// Authentication failed.
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    /// Reading a secret failed.
    #[error("Failed to read secret at '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: Box<VaultError>,
    },

    /// Writing a secret failed.
    #[error("Failed to write secret at '{path}': {source}")]
    Write {
        path: String,
        #[source]
        source: Box<VaultError>,
    },

    /// Deleting a secret failed.
    #[error("Failed to delete secret at '{path}': {source}")]
    Delete {
        path: String,
        #[source]
        source: Box<VaultError>,
    },

    /// No secret exists at the path.
    #[error("No secret found at '{path}'")]
    NotFound { path: String },

    /// The store rejected the request.
    #[error("Store error: {status} - {message}")]
    Api { status: u16, message: String },

    /// A response arrived but did not carry the expected payload.
    #[error("Store response is missing {0}")]
    MissingData(&'static str),

    /// Network error.
    #[error("Network error: {0}")]
    Network(reqwest::Error),

    /// Request timed out.
    #[error("Request timed out: {0}")]
    Timeout(reqwest::Error),

    /// No session token is held, so there is nothing to renew.
    #[error("No session token to renew")]
    NoTokenToRenew,

    /// The operation only makes sense under AppRole authentication.
    #[error("{0} is not applicable to token authentication")]
    NotApplicable(&'static str),

    /// All retry attempts were consumed.
    #[error("Operation failed after {retries} retries: {source}")]
    RetryExhausted {
        retries: u32,
        #[source]
        source: Box<VaultError>,
    },

    /// The operation was cancelled before it could complete.
    #[error("Operation cancelled")]
    Cancelled,

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl VaultError {
    /// Create a config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create an API error.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Wrap an error as a read failure at `path`.
    pub fn read(path: impl Into<String>, source: VaultError) -> Self {
        Self::Read {
            path: path.into(),
            source: Box::new(source),
        }
    }

    /// Wrap an error as a write failure at `path`.
    pub fn write(path: impl Into<String>, source: VaultError) -> Self {
        Self::Write {
            path: path.into(),
            source: Box::new(source),
        }
    }

    /// Wrap an error as a delete failure at `path`.
    pub fn delete(path: impl Into<String>, source: VaultError) -> Self {
        Self::Delete {
            path: path.into(),
            source: Box::new(source),
        }
    }

    /// Check whether this error means the secret does not exist,
    /// looking through path and retry wrappers.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound { .. } => true,
            Self::Read { source, .. }
            | Self::Write { source, .. }
            | Self::Delete { source, .. }
            | Self::RetryExhausted { source, .. } => source.is_not_found(),
            _ => false,
        }
    }

    /// Check if this error is worth retrying on a fresh connection.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) | Self::Timeout(_) => true,
            Self::Api { status, .. } => *status >= 500,
            Self::Read { source, .. }
            | Self::Write { source, .. }
            | Self::Delete { source, .. }
            | Self::RetryExhausted { source, .. } => source.is_retryable(),
            _ => false,
        }
    }
}

impl From<reqwest::Error> for VaultError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err)
        } else {
            Self::Network(err)
        }
    }
}

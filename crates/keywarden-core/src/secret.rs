//! Zeroizing wrapper for credential material.
//!
//! AppRole pairs, static tokens, and issued session tokens all travel
//! through [`SecretString`]. The wrapper wipes its memory on drop and
//! redacts itself in `Debug` and `Display`, so a formatted `Config` or a
//! traced request can never carry a credential into the logs.
//! Serialization stays transparent because the config file is where the
//! AppRole pair legitimately lives.

use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Placeholder emitted wherever a secret would otherwise be formatted.
const REDACTED: &str = "[REDACTED]";

/// A credential value that is zeroed on drop and redacted in output.
#[derive(Clone, Default, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(transparent)]
pub struct SecretString {
    inner: String,
}

impl SecretString {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            inner: value.into(),
        }
    }

    /// Borrow the raw value for wire use (login bodies, the token header).
    pub fn expose_secret(&self) -> &str {
        &self.inner
    }

    /// Whether the credential is blank. The auth layer treats blank
    /// credentials as a misconfiguration and refuses to send them.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl From<String> for SecretString {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for SecretString {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

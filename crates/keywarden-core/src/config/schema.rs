//! Configuration schema definitions.

use crate::paths;
use crate::secret::SecretString;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main Keywarden configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Secret store connection and authentication.
    #[serde(default)]
    pub vault: VaultConfig,

    /// Retry behavior for store operations.
    #[serde(default)]
    pub retry: RetryConfig,

    /// Key staging settings.
    #[serde(default)]
    pub staging: StagingConfig,
}

/// Secret store connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaultConfig {
    /// Store base URL.
    #[serde(default = "default_address")]
    pub address: String,

    /// KV backend mount point.
    #[serde(default = "default_mount")]
    pub mount: String,

    /// KV backend version (1 or 2).
    #[serde(default = "default_kv_version")]
    pub kv_version: u8,

    /// Mount of the AppRole auth method.
    #[serde(default = "default_auth_mount")]
    pub auth_mount: String,

    /// AppRole role_id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_id: Option<SecretString>,

    /// AppRole secret_id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_id: Option<SecretString>,

    /// Static token, as an alternative to AppRole.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<SecretString>,

    /// AppRole role name, required only by secret_id maintenance commands.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approle: Option<String>,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl VaultConfig {
    /// Request timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            mount: default_mount(),
            kv_version: default_kv_version(),
            auth_mount: default_auth_mount(),
            role_id: None,
            secret_id: None,
            token: None,
            approle: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_address() -> String {
    "https://127.0.0.1:8200".to_string()
}

fn default_mount() -> String {
    "secret".to_string()
}

fn default_kv_version() -> u8 {
    2
}

fn default_auth_mount() -> String {
    "approle".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

/// Retry behavior for store operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Retries after the initial attempt.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Fixed delay between attempts, in seconds.
    #[serde(default = "default_retry_delay_secs")]
    pub delay_secs: u64,
}

impl RetryConfig {
    /// Delay between attempts as a [`Duration`].
    pub fn delay(&self) -> Duration {
        Duration::from_secs(self.delay_secs)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            delay_secs: default_retry_delay_secs(),
        }
    }
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay_secs() -> u64 {
    1
}

/// Key staging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StagingConfig {
    /// Directory where key files are staged (tmpfs expected).
    #[serde(default = "default_staging_dir")]
    pub dir: PathBuf,
}

impl Default for StagingConfig {
    fn default() -> Self {
        Self {
            dir: default_staging_dir(),
        }
    }
}

fn default_staging_dir() -> PathBuf {
    paths::staging_dir()
}

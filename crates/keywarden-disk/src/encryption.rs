//! Encryption tool interface and the cryptsetup implementation.

use std::ffi::OsStr;
use std::path::Path;

use async_trait::async_trait;
use tracing::info;

use crate::error::Result;
use crate::process::run_checked;

/// Interface to the tool that formats and opens encrypted devices.
#[async_trait]
pub trait EncryptionTool: Send + Sync {
    /// Initialize encryption on `device` using the key in `key_file`,
    /// stamping the volume with `uuid`.
    async fn format(&self, device: &Path, key_file: &Path, uuid: &str) -> Result<()>;

    /// Open the encrypted `device` with the key in `key_file`, mapping it
    /// as `/dev/mapper/<name>`.
    async fn open(&self, device: &Path, key_file: &Path, name: &str) -> Result<()>;
}

/// [`EncryptionTool`] backed by the `cryptsetup` binary.
pub struct Cryptsetup {
    binary: String,
}

impl Cryptsetup {
    pub fn new() -> Self {
        Self {
            binary: "cryptsetup".to_string(),
        }
    }

    /// Use a specific cryptsetup binary instead of resolving via PATH.
    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }
}

impl Default for Cryptsetup {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EncryptionTool for Cryptsetup {
    async fn format(&self, device: &Path, key_file: &Path, uuid: &str) -> Result<()> {
        info!(device = %device.display(), uuid, "formatting LUKS volume");
        let args: Vec<&OsStr> = vec![
            "luksFormat".as_ref(),
            "--batch-mode".as_ref(),
            "--uuid".as_ref(),
            uuid.as_ref(),
            "--key-file".as_ref(),
            key_file.as_os_str(),
            device.as_os_str(),
        ];
        run_checked(&self.binary, &args).await
    }

    async fn open(&self, device: &Path, key_file: &Path, name: &str) -> Result<()> {
        info!(device = %device.display(), name, "opening LUKS volume");
        let args: Vec<&OsStr> = vec![
            "open".as_ref(),
            "--key-file".as_ref(),
            key_file.as_os_str(),
            device.as_os_str(),
            name.as_ref(),
        ];
        run_checked(&self.binary, &args).await
    }
}

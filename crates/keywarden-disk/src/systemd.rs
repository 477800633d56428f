//! Service supervisor interface and the systemctl implementation.

use std::ffi::OsStr;

use async_trait::async_trait;
use tracing::info;

use crate::error::Result;
use crate::process::run_checked;

/// Unit that re-opens the volume at boot, instantiated per UUID.
pub fn decrypt_unit(uuid: &str) -> String {
    format!("keywarden-decrypt@{uuid}.service")
}

/// Interface to the init system's unit management.
#[async_trait]
pub trait ServiceSupervisor: Send + Sync {
    /// Enable `unit` so it starts at boot.
    async fn enable(&self, unit: &str) -> Result<()>;

    /// Disable `unit`.
    async fn disable(&self, unit: &str) -> Result<()>;
}

/// [`ServiceSupervisor`] backed by the `systemctl` binary.
pub struct Systemctl {
    binary: String,
}

impl Systemctl {
    pub fn new() -> Self {
        Self {
            binary: "systemctl".to_string(),
        }
    }

    /// Use a specific systemctl binary instead of resolving via PATH.
    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }
}

impl Default for Systemctl {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ServiceSupervisor for Systemctl {
    async fn enable(&self, unit: &str) -> Result<()> {
        info!(unit, "enabling unit");
        let args: Vec<&OsStr> = vec!["enable".as_ref(), unit.as_ref()];
        run_checked(&self.binary, &args).await
    }

    async fn disable(&self, unit: &str) -> Result<()> {
        info!(unit, "disabling unit");
        let args: Vec<&OsStr> = vec!["disable".as_ref(), unit.as_ref()];
        run_checked(&self.binary, &args).await
    }
}

//! Block device resolution by volume UUID.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::error::{DiskError, Result};
use crate::process::run_checked;

/// Interface for finding the block device that carries a volume UUID.
#[async_trait]
pub trait DeviceResolver: Send + Sync {
    /// Resolve the device node for `uuid`, waiting for it to appear.
    async fn resolve(&self, uuid: &str) -> Result<PathBuf>;
}

/// [`DeviceResolver`] that waits for the udev-managed
/// `/dev/disk/by-uuid/<uuid>` symlink.
pub struct UdevResolver {
    by_uuid_dir: PathBuf,
    timeout: Duration,
    poll_interval: Duration,
}

impl UdevResolver {
    pub fn new() -> Self {
        Self {
            by_uuid_dir: PathBuf::from("/dev/disk/by-uuid"),
            timeout: Duration::from_secs(10),
            poll_interval: Duration::from_millis(200),
        }
    }

    /// How long to wait for the device before giving up.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// How often to re-check for the symlink.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Look for symlinks under `dir` instead of `/dev/disk/by-uuid`.
    pub fn with_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.by_uuid_dir = dir.into();
        self
    }
}

impl Default for UdevResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DeviceResolver for UdevResolver {
    async fn resolve(&self, uuid: &str) -> Result<PathBuf> {
        // Flush pending udev events so a freshly stamped volume has its
        // by-uuid symlink. Environments without udevadm just poll.
        if let Err(e) = run_checked("udevadm", &["settle".as_ref()]).await {
            debug!("udevadm settle unavailable: {e}");
        }

        let link = self.by_uuid_dir.join(uuid);
        let deadline = tokio::time::Instant::now() + self.timeout;

        loop {
            if tokio::fs::try_exists(&link).await.unwrap_or(false) {
                let device = tokio::fs::canonicalize(&link)
                    .await
                    .unwrap_or_else(|_| link.clone());
                debug!(uuid, device = %device.display(), "resolved device");
                return Ok(device);
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(DiskError::DeviceNotFound {
                    uuid: uuid.to_string(),
                });
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

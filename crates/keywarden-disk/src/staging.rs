//! Key file staging.
//!
//! dm-crypt tools take key material through a file, so for the short window
//! between fetching a key and handing it to the tool the key lives on disk.
//! The staging directory should be tmpfs (`/run/keywarden` by default); the
//! file is created with mode 0600 at open time so there is no moment where
//! the content is readable by anyone else, and [`StagedKey::destroy`]
//! overwrites and unlinks it when the window closes.

use std::path::{Path, PathBuf};

use rand::{Rng, RngCore};
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use keywarden_core::config::StagingConfig;

use crate::error::{DiskError, Result};

/// Factory for staged key files under a fixed directory.
pub struct KeyStaging {
    dir: PathBuf,
}

impl KeyStaging {
    /// Create a staging factory rooted at `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Create a staging factory from configuration.
    pub fn from_config(config: &StagingConfig) -> Self {
        Self::new(config.dir.clone())
    }

    /// The staging directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write `key` to a fresh file in the staging directory.
    ///
    /// The file gets a random name and mode 0600 from the moment it
    /// exists. The caller owns the returned [`StagedKey`] and must call
    /// [`StagedKey::destroy`] once the key has been consumed.
    pub async fn stage(&self, key: &[u8]) -> Result<StagedKey> {
        self.ensure_dir().await?;

        let name = format!("key-{:016x}", rand::thread_rng().gen::<u64>());
        let path = self.dir.join(name);

        let mut options = tokio::fs::OpenOptions::new();
        options.write(true).create_new(true);
        #[cfg(unix)]
        options.mode(0o600);

        let mut file = options.open(&path).await.map_err(|e| {
            DiskError::staging(format!("could not create {}: {e}", path.display()))
        })?;

        if let Err(e) = write_and_sync(&mut file, key).await {
            // Do not leave a half-written key file behind.
            drop(file);
            let _ = std::fs::remove_file(&path);
            return Err(DiskError::staging(format!(
                "could not write {}: {e}",
                path.display()
            )));
        }
        drop(file);

        debug!(path = %path.display(), bytes = key.len(), "staged key material");
        Ok(StagedKey {
            path,
            destroyed: false,
        })
    }

    /// Make sure the staging directory exists and is private.
    async fn ensure_dir(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o700);
            tokio::fs::set_permissions(&self.dir, perms).await?;
        }

        Ok(())
    }
}

async fn write_and_sync(file: &mut tokio::fs::File, key: &[u8]) -> std::io::Result<()> {
    file.write_all(key).await?;
    file.sync_all().await?;
    Ok(())
}

/// A key file that exists on disk until destroyed.
///
/// [`destroy`](Self::destroy) is the normal exit; `Drop` removes the file
/// as a fallback for early-return paths, without the overwrite pass.
#[derive(Debug)]
pub struct StagedKey {
    path: PathBuf,
    destroyed: bool,
}

impl StagedKey {
    /// Path to hand to the encryption tool as `--key-file`.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Overwrite the file with random bytes, flush, and unlink it.
    ///
    /// Every step is best-effort: a failed overwrite never blocks the
    /// unlink, and an unlink failure is logged rather than escalated. By
    /// the time this returns the file is gone in every case the process
    /// can influence.
    pub async fn destroy(mut self) {
        self.destroyed = true;
        shred(&self.path).await;
    }
}

impl Drop for StagedKey {
    fn drop(&mut self) {
        if self.destroyed {
            return;
        }
        // Synchronous removal only; the overwrite pass needs the async
        // runtime and destroy() is the path that provides it.
        match std::fs::remove_file(&self.path) {
            Ok(()) => warn!(path = %self.path.display(), "staged key removed by drop fallback"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %self.path.display(), "staged key left behind: {e}"),
        }
    }
}

async fn shred(path: &Path) {
    match tokio::fs::OpenOptions::new().write(true).open(path).await {
        Ok(mut file) => {
            let len = file.metadata().await.map(|m| m.len() as usize).unwrap_or(0);
            if len > 0 {
                let mut noise = vec![0u8; len];
                rand::thread_rng().fill_bytes(&mut noise);
                if let Err(e) = file.write_all(&noise).await {
                    warn!(path = %path.display(), "overwrite of staged key failed: {e}");
                } else if let Err(e) = file.sync_all().await {
                    warn!(path = %path.display(), "sync of staged key failed: {e}");
                }
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => {
            warn!(path = %path.display(), "could not reopen staged key for overwrite: {e}");
        }
    }

    match tokio::fs::remove_file(path).await {
        Ok(()) => debug!(path = %path.display(), "destroyed staged key"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), "could not remove staged key: {e}"),
    }
}

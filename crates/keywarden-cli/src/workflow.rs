//! Encrypt, decrypt, and retire workflows.
//!
//! These functions sequence the store client, key staging, and the
//! external tools into the three volume lifecycle operations. The
//! collaborators come in as trait objects so the sequencing is testable
//! without real devices.
//!
//! Ordering rule for encrypt: the key record is written to the store
//! BEFORE the device is formatted. A crash between the two leaves an
//! unused record behind, which is harmless; the reverse order could leave
//! an encrypted device whose key exists nowhere.

use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::info;
use uuid::Uuid;

use keywarden_core::record::{system_hostname, KeyRecord};
use keywarden_disk::{
    decrypt_unit, DeviceResolver, EncryptionTool, KeyStaging, ServiceSupervisor,
};
use keywarden_vault::VaultClient;

/// Options for [`encrypt_device`].
pub struct EncryptOptions {
    /// Block device to encrypt.
    pub device: PathBuf,
    /// Volume UUID; generated when `None`.
    pub uuid: Option<String>,
}

/// Options for [`decrypt_device`].
pub struct DecryptOptions {
    /// UUID of the volume to open.
    pub uuid: String,
}

/// Options for [`retire_device`].
pub struct RetireOptions {
    /// UUID of the volume to retire.
    pub uuid: String,
    /// Leave the key record in the store.
    pub keep_secret: bool,
}

/// Store path for a volume's key record.
pub fn secret_path(uuid: &str) -> String {
    let host = system_hostname().unwrap_or_else(|| "unknown-host".to_string());
    format!("{host}/{uuid}")
}

/// Device-mapper name for an opened volume.
pub fn mapper_name(uuid: &str) -> String {
    format!("crypt-{uuid}")
}

/// Encrypt `opts.device`: generate a key, store it, format and open the
/// device, and enable the boot-time decrypt unit. Returns the volume UUID.
pub async fn encrypt_device(
    client: &VaultClient,
    tool: &dyn EncryptionTool,
    supervisor: &dyn ServiceSupervisor,
    staging: &KeyStaging,
    opts: EncryptOptions,
) -> anyhow::Result<String> {
    let uuid = opts.uuid.unwrap_or_else(|| Uuid::new_v4().to_string());
    let device = opts.device.as_path();

    let record = KeyRecord::generate(&device.display().to_string());
    let key = record
        .decode_key()
        .context("Generated key failed to decode")?;

    let path = secret_path(&uuid);
    client
        .write(&path, &record.to_record())
        .await
        .with_context(|| format!("Failed to store key for volume {uuid}"))?;
    info!(%uuid, path = %path, "key record stored");

    let staged = staging
        .stage(&key)
        .await
        .context("Failed to stage key material")?;
    let result = async {
        tool.format(device, staged.path(), &uuid)
            .await
            .with_context(|| format!("Failed to format {}", device.display()))?;
        tool.open(device, staged.path(), &mapper_name(&uuid))
            .await
            .with_context(|| format!("Failed to open {}", device.display()))?;
        Ok::<_, anyhow::Error>(())
    }
    .await;
    staged.destroy().await;
    result?;

    supervisor
        .enable(&decrypt_unit(&uuid))
        .await
        .with_context(|| format!("Failed to enable boot unit for volume {uuid}"))?;

    info!(%uuid, device = %device.display(), "volume encrypted and registered");
    Ok(uuid)
}

/// Open the encrypted volume `opts.uuid` with its stored key. Returns the
/// resolved device node.
pub async fn decrypt_device(
    client: &VaultClient,
    tool: &dyn EncryptionTool,
    resolver: &dyn DeviceResolver,
    staging: &KeyStaging,
    opts: DecryptOptions,
) -> anyhow::Result<PathBuf> {
    let uuid = opts.uuid;
    let path = secret_path(&uuid);

    let stored = client
        .read(&path)
        .await
        .with_context(|| format!("Failed to retrieve key for volume {uuid}"))?;
    let record = KeyRecord::from_record(&stored)
        .with_context(|| format!("Stored record for volume {uuid} is unusable"))?;
    let key = record
        .decode_key()
        .with_context(|| format!("Stored key for volume {uuid} is malformed"))?;

    let device = resolver
        .resolve(&uuid)
        .await
        .with_context(|| format!("No block device found for volume {uuid}"))?;

    let staged = staging
        .stage(&key)
        .await
        .context("Failed to stage key material")?;
    let result = tool.open(&device, staged.path(), &mapper_name(&uuid)).await;
    staged.destroy().await;
    result.with_context(|| format!("Failed to open {}", device.display()))?;

    info!(%uuid, device = %device.display(), "volume opened");
    Ok(device)
}

/// Retire the volume `opts.uuid`: disable its boot unit and delete the
/// stored key unless `keep_secret` is set.
pub async fn retire_device(
    client: &VaultClient,
    supervisor: &dyn ServiceSupervisor,
    opts: RetireOptions,
) -> anyhow::Result<()> {
    let uuid = opts.uuid;

    supervisor
        .disable(&decrypt_unit(&uuid))
        .await
        .with_context(|| format!("Failed to disable boot unit for volume {uuid}"))?;

    if opts.keep_secret {
        info!(%uuid, "keeping stored key record");
    } else {
        let path = secret_path(&uuid);
        client
            .delete(&path)
            .await
            .with_context(|| format!("Failed to delete key record for volume {uuid}"))?;
        info!(%uuid, "key record deleted");
    }

    Ok(())
}

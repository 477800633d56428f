//! # keywarden-disk
//!
//! The disk-facing half of Keywarden: staging key files for dm-crypt
//! tools, and thin async interfaces over the external commands the
//! workflows drive (`cryptsetup`, `systemctl`, udev).
//!
//! The traits here are the seams the workflow tests mock; the shipped
//! implementations shell out via `tokio::process`.

pub mod devices;
pub mod encryption;
pub mod error;
mod process;
pub mod staging;
pub mod systemd;

pub use devices::{DeviceResolver, UdevResolver};
pub use encryption::{Cryptsetup, EncryptionTool};
pub use error::{DiskError, Result};
pub use staging::{KeyStaging, StagedKey};
pub use systemd::{decrypt_unit, ServiceSupervisor, Systemctl};

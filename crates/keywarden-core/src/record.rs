//! The key record stored for each encrypted volume.
//!
//! Records travel through the store as flat string maps so any KV backend
//! can hold them. [`KeyRecord`] is the typed view: the base64 dm-crypt key
//! plus provenance metadata (when it was created, for which device, on
//! which host).

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{DateTime, SecondsFormat, Utc};
use rand::RngCore;
use std::collections::HashMap;
use zeroize::Zeroizing;

use crate::error::RecordError;

/// Flat string map as written to and read from the store.
pub type SecretRecord = HashMap<String, String>;

/// Size in bytes of a generated dm-crypt key.
pub const KEY_SIZE: usize = 512;

/// Record field holding the base64 key material.
pub const FIELD_KEY: &str = "dmcrypt_key";

/// Record field holding the RFC 3339 creation timestamp.
pub const FIELD_CREATED_AT: &str = "created_at";

/// Record field holding the block device path at creation time.
pub const FIELD_DEVICE: &str = "device";

/// Record field holding the creating host's name.
pub const FIELD_HOSTNAME: &str = "hostname";

/// Typed view of a stored key record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyRecord {
    /// Base64-encoded dm-crypt key material.
    pub dmcrypt_key: String,

    /// When the key was generated.
    pub created_at: Option<DateTime<Utc>>,

    /// Block device the key was generated for.
    pub device: Option<String>,

    /// Host that generated the key.
    pub hostname: Option<String>,
}

impl KeyRecord {
    /// Generate a fresh record for `device` with new random key material.
    pub fn generate(device: &str) -> Self {
        let mut key = Zeroizing::new(vec![0u8; KEY_SIZE]);
        rand::thread_rng().fill_bytes(&mut key);

        Self {
            dmcrypt_key: BASE64.encode(key.as_slice()),
            created_at: Some(Utc::now()),
            device: Some(device.to_string()),
            hostname: system_hostname(),
        }
    }

    /// Decode the key material.
    ///
    /// The returned buffer is zeroed when dropped. Decoding happens before
    /// the key is ever staged to disk, so a corrupt record fails without
    /// leaving any file behind.
    pub fn decode_key(&self) -> Result<Zeroizing<Vec<u8>>, RecordError> {
        let bytes = BASE64
            .decode(&self.dmcrypt_key)
            .map_err(|e| RecordError::InvalidKeyEncoding(e.to_string()))?;
        Ok(Zeroizing::new(bytes))
    }

    /// Build the typed view from a stored record.
    ///
    /// The key field is required; metadata fields are tolerated when absent
    /// so records written by older versions still decrypt.
    pub fn from_record(record: &SecretRecord) -> Result<Self, RecordError> {
        let dmcrypt_key = record
            .get(FIELD_KEY)
            .ok_or(RecordError::MissingField(FIELD_KEY))?
            .clone();

        let created_at = match record.get(FIELD_CREATED_AT) {
            Some(raw) => Some(
                DateTime::parse_from_rfc3339(raw)
                    .map(|dt| dt.with_timezone(&Utc))
                    .map_err(|e| RecordError::InvalidTimestamp {
                        value: raw.clone(),
                        reason: e.to_string(),
                    })?,
            ),
            None => None,
        };

        Ok(Self {
            dmcrypt_key,
            created_at,
            device: record.get(FIELD_DEVICE).cloned(),
            hostname: record.get(FIELD_HOSTNAME).cloned(),
        })
    }

    /// Flatten into the string map written to the store.
    pub fn to_record(&self) -> SecretRecord {
        let mut record = SecretRecord::new();
        record.insert(FIELD_KEY.to_string(), self.dmcrypt_key.clone());
        if let Some(created_at) = self.created_at {
            record.insert(
                FIELD_CREATED_AT.to_string(),
                created_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            );
        }
        if let Some(device) = &self.device {
            record.insert(FIELD_DEVICE.to_string(), device.clone());
        }
        if let Some(hostname) = &self.hostname {
            record.insert(FIELD_HOSTNAME.to_string(), hostname.clone());
        }
        record
    }
}

/// The local host's name, as used in store paths and record metadata.
pub fn system_hostname() -> Option<String> {
    hostname::get()
        .ok()
        .map(|h| h.to_string_lossy().into_owned())
        .filter(|h| !h.is_empty())
}

//! KV backend addressing and payload envelopes.
//!
//! Version 1 and version 2 KV backends differ in two ways that matter to
//! us: v2 interposes a `data` segment between the mount and the secret
//! path, and v2 nests the record inside a `data` envelope in both request
//! and response bodies. Everything else in the client is version-agnostic,
//! so those two differences are isolated here.

use serde_json::{json, Value};

use keywarden_core::SecretRecord;

use crate::error::VaultError;

/// KV backend version the mount was created with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KvVersion {
    V1,
    V2,
}

impl TryFrom<u8> for KvVersion {
    type Error = VaultError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::V1),
            2 => Ok(Self::V2),
            other => Err(VaultError::config(format!(
                "unsupported kv_version {} (expected 1 or 2)",
                other
            ))),
        }
    }
}

/// API path for the secret at `path` under `mount`.
pub fn data_path(mount: &str, version: KvVersion, path: &str) -> String {
    match version {
        KvVersion::V1 => format!("{}/{}", mount, path),
        KvVersion::V2 => format!("{}/data/{}", mount, path),
    }
}

/// Shape a record into the request body the backend version expects.
pub fn wrap_write(version: KvVersion, record: &SecretRecord) -> Value {
    match version {
        KvVersion::V1 => json!(record),
        KvVersion::V2 => json!({ "data": record }),
    }
}

/// Recover a record from the `data` payload of a read response.
///
/// For v2 backends the record sits one level deeper, under a nested
/// `data` key next to `metadata`.
pub fn unwrap_read(version: KvVersion, data: Value) -> Result<SecretRecord, VaultError> {
    let record = match version {
        KvVersion::V1 => data,
        KvVersion::V2 => match data {
            Value::Object(mut fields) => fields
                .remove("data")
                .ok_or(VaultError::MissingData("nested data field"))?,
            _ => return Err(VaultError::MissingData("data object")),
        },
    };
    serde_json::from_value(record).map_err(VaultError::from)
}

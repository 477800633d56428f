//! Path resolution utilities.
//!
//! Keywarden runs as a system tool, so its paths live under `/etc` and
//! `/run` rather than a user home directory.

use std::path::PathBuf;

/// Directory holding the system configuration (/etc/keywarden).
pub fn config_dir() -> PathBuf {
    PathBuf::from("/etc/keywarden")
}

/// Default config file path (/etc/keywarden/keywarden.json5).
pub fn config_file() -> PathBuf {
    config_dir().join("keywarden.json5")
}

/// Default key staging directory (/run/keywarden).
///
/// `/run` is tmpfs on any supported system, so staged key files never
/// touch persistent storage.
pub fn staging_dir() -> PathBuf {
    PathBuf::from("/run/keywarden")
}

//! Config save/load roundtrip integration tests.
//!
//! These tests verify that configuration can be serialized, written to disk,
//! and loaded back with identical field values.

use keywarden_core::config::Config;
use std::path::Path;
use tempfile::TempDir;

#[test]
fn test_config_save_and_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("keywarden.json5");

    let config = Config::default();
    config.save(&path).unwrap();

    let loaded = Config::load(&path).unwrap();
    // Store connection defaults should survive the roundtrip
    assert_eq!(loaded.vault.address, config.vault.address);
    assert_eq!(loaded.vault.mount, config.vault.mount);
    assert_eq!(loaded.vault.kv_version, config.vault.kv_version);
    // Retry and staging defaults should survive the roundtrip
    assert_eq!(loaded.retry.max_retries, config.retry.max_retries);
    assert_eq!(loaded.staging.dir, config.staging.dir);
}

#[test]
fn test_config_modify_and_reload() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("keywarden.json5");

    let mut config = Config::default();
    config.vault.mount = "kv".to_string();
    config.vault.kv_version = 1;
    config.retry.max_retries = 7;
    config.save(&path).unwrap();

    let loaded = Config::load(&path).unwrap();
    assert_eq!(loaded.vault.mount, "kv");
    assert_eq!(loaded.vault.kv_version, 1);
    assert_eq!(loaded.retry.max_retries, 7);
}

#[test]
fn test_config_load_handwritten_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("keywarden.json5");

    // The on-disk format is JSON5, so an operator-edited file with
    // comments and trailing commas must load.
    std::fs::write(
        &path,
        r#"{
            // production store
            vault: {
                address: "https://vault.internal:8200",
                timeout_secs: 10,
            },
            staging: { dir: "/run/keywarden" },
        }"#,
    )
    .unwrap();

    let loaded = Config::load(&path).unwrap();
    assert_eq!(loaded.vault.address, "https://vault.internal:8200");
    assert_eq!(loaded.vault.timeout_secs, 10);
    assert_eq!(loaded.staging.dir, Path::new("/run/keywarden"));
    assert!(loaded.validate().is_ok());
}

#[test]
fn test_config_load_nonexistent() {
    let result = Config::load(Path::new("/nonexistent/keywarden.json5"));
    assert!(result.is_err());
}

#[test]
fn test_config_parse_invalid() {
    let result = Config::parse("not valid json5");
    assert!(result.is_err());
}

//! CLI binary integration tests.
//!
//! These tests exercise the compiled `keywarden` binary to verify that
//! top-level command routing, help text, and error handling work as expected.

use std::fs;
use std::path::PathBuf;
use std::process::Command;

/// Locate the compiled `keywarden` binary in the workspace target directory.
///
/// Cargo sets `CARGO_MANIFEST_DIR` to the manifest directory of the package
/// being tested. We navigate up to the workspace root and look inside
/// `target/debug/`.
fn keywarden_bin() -> PathBuf {
    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    // tests/integration -> workspace root
    let workspace_root = manifest_dir
        .parent()
        .expect("tests/ parent")
        .parent()
        .expect("workspace root");
    let bin = workspace_root.join("target").join("debug").join("keywarden");
    assert!(
        bin.exists(),
        "keywarden binary not found at {}; run `cargo build -p keywarden-cli` first",
        bin.display()
    );
    bin
}

fn keywarden_cmd() -> Command {
    Command::new(keywarden_bin())
}

#[test]
fn test_cli_version() {
    let output = keywarden_cmd()
        .arg("version")
        .output()
        .expect("failed to run keywarden");
    assert!(output.status.success(), "version command should succeed");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("keywarden"),
        "version output should contain 'keywarden', got: {}",
        stdout
    );
}

#[test]
fn test_cli_help() {
    let output = keywarden_cmd()
        .arg("--help")
        .output()
        .expect("failed to run keywarden");
    assert!(output.status.success(), "--help should succeed");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("encrypt"),
        "help output should mention 'encrypt', got: {}",
        stdout
    );
    assert!(
        stdout.contains("decrypt"),
        "help output should mention 'decrypt', got: {}",
        stdout
    );
}

#[test]
fn test_cli_unknown_command() {
    let output = keywarden_cmd()
        .arg("nonexistent-command")
        .output()
        .expect("failed to run keywarden");
    assert!(
        !output.status.success(),
        "unknown command should return non-zero exit code"
    );
}

#[test]
fn test_cli_encrypt_requires_device() {
    let output = keywarden_cmd()
        .arg("encrypt")
        .output()
        .expect("failed to run keywarden encrypt");
    assert!(
        !output.status.success(),
        "encrypt without a device should return non-zero exit code"
    );
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("DEVICE") || stderr.contains("device"),
        "error should name the missing device argument, got: {}",
        stderr
    );
}

#[test]
fn test_cli_decrypt_unreachable_store_exits_tempfail() {
    // Nothing listens on the discard port, so the store read fails with a
    // connection error. The boot unit tells transient failures apart from
    // permanent ones by exit status (75 is sysexits EX_TEMPFAIL).
    let dir = tempfile::tempdir().expect("tempdir");
    let config_path = dir.path().join("keywarden.json5");
    fs::write(
        &config_path,
        r#"{
            vault: {
                address: "http://127.0.0.1:9",
                role_id: "role-1",
                secret_id: "secret-1",
            },
            retry: { max_retries: 0, delay_secs: 0 },
        }"#,
    )
    .expect("write config");

    let output = keywarden_cmd()
        .arg("--config")
        .arg(&config_path)
        .args(["decrypt", "2f9d3b7c-8a41-4e2e-9d3a-5b6c7d8e9f00"])
        .env_remove("VAULT_ADDR")
        .env_remove("VAULT_TOKEN")
        .env_remove("KEYWARDEN_ROLE_ID")
        .env_remove("KEYWARDEN_SECRET_ID")
        .output()
        .expect("failed to run keywarden decrypt");
    assert_eq!(
        output.status.code(),
        Some(75),
        "transient store failure should exit EX_TEMPFAIL, stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

#[test]
fn test_cli_auth_help() {
    let output = keywarden_cmd()
        .args(["auth", "--help"])
        .output()
        .expect("failed to run keywarden auth --help");
    assert!(output.status.success(), "auth --help should succeed");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("rotate-secret-id"),
        "auth help should mention 'rotate-secret-id', got: {}",
        stdout
    );
    assert!(
        stdout.contains("status"),
        "auth help should mention 'status', got: {}",
        stdout
    );
}

//! Subprocess execution for external tools.

use std::ffi::OsStr;
use std::process::Stdio;

use tokio::process::Command;
use tracing::debug;

use crate::error::{DiskError, Result};

/// Run `program` with `args`, failing unless it exits zero.
///
/// Stdout is discarded; stderr is captured into the error so tool
/// diagnostics survive into our error chain.
pub(crate) async fn run_checked(program: &str, args: &[&OsStr]) -> Result<()> {
    let rendered = render_command(program, args);
    debug!(command = %rendered, "running external tool");

    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|e| DiskError::Spawn {
            command: rendered.clone(),
            source: e,
        })?;

    if output.status.success() {
        return Ok(());
    }

    Err(DiskError::Tool {
        command: rendered,
        status: output.status.code().unwrap_or(-1),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    })
}

fn render_command(program: &str, args: &[&OsStr]) -> String {
    let mut parts = vec![program.to_string()];
    parts.extend(args.iter().map(|a| a.to_string_lossy().into_owned()));
    parts.join(" ")
}

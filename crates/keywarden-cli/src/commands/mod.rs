//! CLI command implementations.

pub mod auth;
pub mod decrypt;
pub mod encrypt;
pub mod retire;

use std::path::Path;

use anyhow::Context;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use keywarden_core::Config;
use keywarden_vault::VaultClient;

/// Load configuration from the explicit path, `KEYWARDEN_CONFIG`, or the
/// default location, with environment overrides applied and validated.
pub(crate) fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    Config::resolve(path).context("Failed to load configuration")
}

/// Build the store client, wired to cancel on ctrl-c.
pub(crate) fn build_client(config: &Config) -> anyhow::Result<VaultClient> {
    let client = VaultClient::from_config(config)
        .context("Failed to configure store client")?
        .with_cancellation(cancel_on_ctrl_c());
    Ok(client)
}

/// A token cancelled when the user interrupts the process.
fn cancel_on_ctrl_c() -> CancellationToken {
    let token = CancellationToken::new();
    let handle = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, stopping");
            handle.cancel();
        }
    });
    token
}

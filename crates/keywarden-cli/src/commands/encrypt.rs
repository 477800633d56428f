//! Encrypt command.

use std::path::{Path, PathBuf};

use clap::Args;

use keywarden_disk::{Cryptsetup, KeyStaging, Systemctl};

use crate::commands;
use crate::workflow::{self, EncryptOptions};

/// Encrypt command arguments.
#[derive(Args)]
pub struct EncryptArgs {
    /// Block device to encrypt (e.g. /dev/sdb1)
    pub device: PathBuf,

    /// Volume UUID (generated when omitted)
    #[arg(long)]
    pub uuid: Option<String>,
}

/// Run the encrypt command.
pub async fn run(args: EncryptArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let config = commands::load_config(config_path)?;
    let client = commands::build_client(&config)?;
    let staging = KeyStaging::from_config(&config.staging);
    let tool = Cryptsetup::new();
    let supervisor = Systemctl::new();

    let uuid = workflow::encrypt_device(
        &client,
        &tool,
        &supervisor,
        &staging,
        EncryptOptions {
            device: args.device,
            uuid: args.uuid,
        },
    )
    .await?;

    println!("Volume {uuid} encrypted; key stored and boot unit enabled.");
    Ok(())
}

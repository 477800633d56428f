//! Decrypt command.
//!
//! Also the body of the `keywarden-decrypt@.service` boot unit, which runs
//! `keywarden decrypt %i`.

use std::path::Path;

use clap::Args;

use keywarden_disk::{Cryptsetup, KeyStaging, UdevResolver};

use crate::commands;
use crate::workflow::{self, mapper_name, DecryptOptions};

/// Decrypt command arguments.
#[derive(Args)]
pub struct DecryptArgs {
    /// UUID of the volume to open
    pub uuid: String,
}

/// Run the decrypt command.
pub async fn run(args: DecryptArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let config = commands::load_config(config_path)?;
    let client = commands::build_client(&config)?;
    let staging = KeyStaging::from_config(&config.staging);
    let tool = Cryptsetup::new();
    let resolver = UdevResolver::new();

    let uuid = args.uuid;
    let device = workflow::decrypt_device(
        &client,
        &tool,
        &resolver,
        &staging,
        DecryptOptions { uuid: uuid.clone() },
    )
    .await?;

    println!(
        "Volume {} opened as /dev/mapper/{} (device {}).",
        uuid,
        mapper_name(&uuid),
        device.display()
    );
    Ok(())
}

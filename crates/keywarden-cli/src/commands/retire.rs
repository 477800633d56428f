//! Retire command.

use std::path::Path;

use clap::Args;

use keywarden_disk::Systemctl;

use crate::commands;
use crate::workflow::{self, RetireOptions};

/// Retire command arguments.
#[derive(Args)]
pub struct RetireArgs {
    /// UUID of the volume to retire
    pub uuid: String,

    /// Keep the key record in the store
    #[arg(long)]
    pub keep_secret: bool,
}

/// Run the retire command.
pub async fn run(args: RetireArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let config = commands::load_config(config_path)?;
    let client = commands::build_client(&config)?;
    let supervisor = Systemctl::new();

    let uuid = args.uuid;
    workflow::retire_device(
        &client,
        &supervisor,
        RetireOptions {
            uuid: uuid.clone(),
            keep_secret: args.keep_secret,
        },
    )
    .await?;

    if args.keep_secret {
        println!("Volume {uuid} retired; key record kept in the store.");
    } else {
        println!("Volume {uuid} retired; key record deleted.");
    }
    Ok(())
}

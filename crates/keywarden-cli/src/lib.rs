//! Keywarden command-line interface.

pub mod commands;
pub mod workflow;

use clap::{Parser, Subcommand};

/// Keywarden - dm-crypt keys backed by a central secret store
#[derive(Parser)]
#[command(name = "keywarden")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase logging verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Path to config file
    #[arg(short, long, env = "KEYWARDEN_CONFIG")]
    pub config: Option<std::path::PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Encrypt a block device, storing its key centrally
    Encrypt(commands::encrypt::EncryptArgs),

    /// Open an encrypted volume with its stored key
    Decrypt(commands::decrypt::DecryptArgs),

    /// Retire an encrypted volume
    Retire(commands::retire::RetireArgs),

    /// Store credential management
    Auth(commands::auth::AuthArgs),

    /// Show version information
    Version,
}

/// Run the CLI with the given arguments.
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Encrypt(args) => commands::encrypt::run(args, config_path).await,
        Commands::Decrypt(args) => commands::decrypt::run(args, config_path).await,
        Commands::Retire(args) => commands::retire::run(args, config_path).await,
        Commands::Auth(args) => commands::auth::run(args, config_path).await,
        Commands::Version => {
            println!("keywarden {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

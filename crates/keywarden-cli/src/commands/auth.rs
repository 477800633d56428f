//! Store credential management commands.

use std::path::Path;

use anyhow::Context;
use clap::Args;

use keywarden_core::Config;

use crate::commands;

/// Auth command arguments.
#[derive(Args)]
pub struct AuthArgs {
    #[command(subcommand)]
    pub command: AuthCommand,
}

#[derive(clap::Subcommand)]
pub enum AuthCommand {
    /// Show session token metadata
    Status,

    /// Mint a replacement secret_id for the AppRole
    RotateSecretId {
        /// Role name (defaults to vault.approle from the config)
        #[arg(long)]
        role: Option<String>,
    },

    /// Show remaining lifetime of the configured secret_id
    SecretIdInfo {
        /// Role name (defaults to vault.approle from the config)
        #[arg(long)]
        role: Option<String>,
    },
}

/// Run the auth command.
pub async fn run(args: AuthArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let config = commands::load_config(config_path)?;
    let client = commands::build_client(&config)?;

    match args.command {
        AuthCommand::Status => {
            let info = client
                .token_info()
                .await
                .context("Failed to look up session token")?;

            println!("Session token");
            println!(
                "  display name: {}",
                info.display_name.unwrap_or_else(|| "-".to_string())
            );
            println!("  ttl:          {}s", info.ttl);
            println!("  renewable:    {}", info.renewable);
            println!(
                "  policies:     {}",
                if info.policies.is_empty() {
                    "-".to_string()
                } else {
                    info.policies.join(", ")
                }
            );
            if let Some(t) = info.expire_time {
                println!("  expires:      {}", t.format("%Y-%m-%d %H:%M:%S UTC"));
            }
        }

        AuthCommand::RotateSecretId { role } => {
            let role = resolve_role(role, &config)?;
            let rotated = client
                .rotate_secret_id(&role)
                .await
                .context("Failed to rotate secret_id")?;

            println!("New secret_id for role '{role}':");
            println!("{}", rotated.secret_id.expose_secret());
            println!("Accessor: {}", rotated.secret_id_accessor);
            println!();
            println!(
                "Update vault.secret_id in the config; the old secret_id stays \
                 valid until it expires or is revoked."
            );
        }

        AuthCommand::SecretIdInfo { role } => {
            let role = resolve_role(role, &config)?;
            let info = client
                .secret_id_info(&role)
                .await
                .context("Failed to look up secret_id")?;

            println!("Secret_id for role '{role}'");
            match info.expiration_time {
                Some(t) => println!("  expires:  {}", t.format("%Y-%m-%d %H:%M:%S UTC")),
                None => println!("  expires:  never"),
            }
            if let Some(t) = info.creation_time {
                println!("  created:  {}", t.format("%Y-%m-%d %H:%M:%S UTC"));
            }
            if let Some(ttl) = info.secret_id_ttl {
                println!("  ttl:      {ttl}s");
            }
            if let Some(uses) = info.secret_id_num_uses {
                let rendered = if uses == 0 {
                    "unlimited".to_string()
                } else {
                    uses.to_string()
                };
                println!("  num uses: {rendered}");
            }
        }
    }

    Ok(())
}

/// Role name from the flag, falling back to `vault.approle` in the config.
fn resolve_role(flag: Option<String>, config: &Config) -> anyhow::Result<String> {
    flag.or_else(|| config.vault.approle.clone()).ok_or_else(|| {
        anyhow::anyhow!("No role name given: pass --role or set vault.approle in the config")
    })
}

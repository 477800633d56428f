//! Keywarden CLI entry point.

use clap::Parser;
use keywarden_cli::{run, Cli};
use keywarden_core::env::vars;
use keywarden_vault::VaultError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Exit status for transient store failures (sysexits `EX_TEMPFAIL`).
///
/// The boot-time decrypt unit restarts on this code; permanent failures
/// such as bad credentials or a missing record exit 1 and stay down.
const EXIT_TEMPFAIL: i32 = 75;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging; KEYWARDEN_LOG wins over the -v flags
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_env(vars::KEYWARDEN_LOG)
                .unwrap_or_else(|_| verbosity_filter(cli.verbose).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(err) = run(cli).await {
        eprintln!("Error: {err:#}");
        std::process::exit(exit_code(&err));
    }
}

fn verbosity_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "info,hyper=warn,reqwest=warn",
        1 => "debug,hyper=info,reqwest=info",
        _ => "trace",
    }
}

/// Pick the exit status for a failed command. A store error that a retry
/// could plausibly clear maps to `EXIT_TEMPFAIL`; everything else is a
/// plain failure.
fn exit_code(err: &anyhow::Error) -> i32 {
    let transient = err
        .chain()
        .filter_map(|cause| cause.downcast_ref::<VaultError>())
        .any(VaultError::is_retryable);
    if transient {
        EXIT_TEMPFAIL
    } else {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keywarden_vault::AuthError;

    #[test]
    fn transient_store_failures_exit_tempfail() {
        let sealed = VaultError::read("db01/vol1", VaultError::api(503, "sealed"));
        let err = anyhow::Error::new(sealed).context("failed to retrieve key from store");
        assert_eq!(exit_code(&err), EXIT_TEMPFAIL);
    }

    #[test]
    fn permanent_failures_exit_plainly() {
        let denied = VaultError::from(AuthError::EmptyRoleId);
        let err = anyhow::Error::new(denied).context("failed to authenticate");
        assert_eq!(exit_code(&err), 1);

        let err = anyhow::anyhow!("device /dev/vdb not found");
        assert_eq!(exit_code(&err), 1);
    }
}

//! `unifi-respondd`: answers respondd requests on the mesh with the state of
//! the UniFi access points a controller manages.

mod cli;
mod error;

use std::io::Write;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use respondd_config::Config;
use respondd_core::{Category, MergedReply, Provider, ProviderError, Responder, UnifiProvider};

use crate::cli::Cli;
use crate::error::{CliError, exit_code};

#[tokio::main]
async fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            std::process::exit(if err.use_stderr() {
                exit_code::USAGE
            } else {
                exit_code::SUCCESS
            });
        }
    };

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

/// Log level when `RUST_LOG` is unset.
fn default_level(verbosity: u8, config_verbose: bool) -> &'static str {
    match verbosity {
        0 if config_verbose => "debug",
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

fn init_tracing(verbosity: u8, config_verbose: bool) {
    let filter = default_level(verbosity, config_verbose);

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let path = respondd_config::config_path(cli.config.as_deref());
    let config = respondd_config::load_config(&path)?;
    init_tracing(cli.verbose, config.verbose);
    debug!(path = %path.display(), "configuration loaded");

    if cli.check_config {
        config.validate()?;
        println!("{}: ok", path.display());
        return Ok(());
    }

    let provider = UnifiProvider::new(config.to_provider_config()?)?;

    if let Some(categories) = cli.dump_categories() {
        return dump(&config, &provider, &categories).await;
    }

    let responder = Responder::bind(&config.to_responder_config()?, provider).await?;

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            shutdown_signal().await;
            info!("received shutdown signal, stopping");
            cancel.cancel();
        }
    });

    responder.run(cancel).await;
    info!("stopped");
    Ok(())
}

/// Poll once and print the merged reply for `categories`.
async fn dump(
    config: &Config,
    provider: &UnifiProvider,
    categories: &[Category],
) -> Result<(), CliError> {
    let timeout = config.to_responder_config()?.poll_timeout;
    let snapshots = tokio::time::timeout(timeout, provider.poll())
        .await
        .map_err(|_| ProviderError::PollTimeout {
            timeout_secs: timeout.as_secs(),
        })??;

    let merged = MergedReply::merge(
        categories
            .iter()
            .flat_map(|category| category.build_all(&snapshots)),
    );
    let json = serde_json::to_string_pretty(&merged).map_err(respondd_core::CodecError::from)?;

    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{json}")?;
    Ok(())
}

#[cfg(unix)]
async fn shutdown_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    match signal(SignalKind::terminate()) {
        Ok(mut terminate) => {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {}
                _ = terminate.recv() => {}
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, "cannot listen for SIGTERM");
            tokio::signal::ctrl_c().await.ok();
        }
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() {
    tokio::signal::ctrl_c().await.ok();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_flags_map_to_levels() {
        assert_eq!(default_level(0, false), "info");
        assert_eq!(default_level(0, true), "debug");
        assert_eq!(default_level(1, false), "debug");
        assert_eq!(default_level(2, false), "trace");
        assert_eq!(default_level(3, true), "trace");
    }
}

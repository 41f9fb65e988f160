//! minedig — DIG mining daemon
//!
//! Loads the JSON configuration named on the command line, unlocks the
//! configured cleos wallet once, then pushes `mine` actions to the
//! `digcoinsmine` contract until interrupted (or until `--iterations`
//! attempts have been made).

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::Parser;
use cleos::CleosHandler;
use config::MinerConfig;
use miner::MineLoop;
use tracing::info;

/// Command-line interface for the mining daemon.
#[derive(Parser, Debug)]
#[command(name = "minedig", about = "DIG mining daemon driving the external cleos client", version)]
struct Cli {
    /// Path to the JSON configuration document
    config_path: PathBuf,
    /// Stop after this many mine attempts instead of running forever
    #[arg(long)]
    iterations: Option<u64>,
    /// Override the default 10ms pause between mine attempts
    #[arg(long)]
    interval_ms: Option<u64>,
}

/// Parse arguments, keeping the historical exit codes: bad invocations exit
/// 1 with a usage message, `--help`/`--version` exit 0.
fn parse_cli() -> Cli {
    match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let code = match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => 1,
            };
            let _ = err.print();
            std::process::exit(code);
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = parse_cli();

    let config = MinerConfig::load(&cli.config_path)
        .with_context(|| format!("loading config from {}", cli.config_path.display()))?;

    let handler =
        CleosHandler::connect(&config.cleos).await.context("initializing cleos handler")?;

    info!("mining as {} via {}", config.cleos.account, config.cleos.api_url);

    let mut mine_loop = MineLoop::new(Arc::new(handler));
    if let Some(limit) = cli.iterations {
        mine_loop = mine_loop.with_iteration_limit(limit);
    }
    if let Some(ms) = cli.interval_ms {
        mine_loop = mine_loop.with_interval(Duration::from_millis(ms));
    }

    tokio::select! {
        iterations = mine_loop.run() => {
            info!("mining stopped after {} attempts", iterations);
        }
        _ = tokio::signal::ctrl_c() => {
            info!("interrupted, shutting down");
        }
    }

    Ok(())
}

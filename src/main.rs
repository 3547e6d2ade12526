//! Sonoma CLI
//!
//! Command-line entry point. Builds the process-wide configuration store once
//! and hands it to the command handlers.

use anyhow::Result;
use clap::Parser;
use sonoma::cli::{Cli, Command, agents, config};
use sonoma::config::{ConfigPaths, ConfigStore};
use std::fs::OpenOptions;
use tracing::{Level, debug};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn init_logging(verbose: bool, log: &str) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    match log {
        "0" | "off" => {
            // No logging
        }
        "1" | "stdout" => {
            let subscriber = FmtSubscriber::builder()
                .with_env_filter(filter)
                .with_writer(std::io::stdout)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        "2" | "stderr" => {
            let subscriber = FmtSubscriber::builder()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        filename => {
            // Log to file (append mode)
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(filename)?;
            let subscriber = FmtSubscriber::builder()
                .with_env_filter(filter)
                .with_writer(file)
                .with_ansi(false)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, &cli.log)?;

    let paths = ConfigPaths::discover();
    debug!(?paths, "Resolved config paths");
    let mut store = ConfigStore::from_paths(&paths);

    let mut stdout = std::io::stdout().lock();
    match cli.command {
        Command::Config(command) => config::run(&mut store, command, &mut stdout).await?,
        Command::Agents(command) => agents::run(&mut store, command, &mut stdout).await?,
    }

    Ok(())
}

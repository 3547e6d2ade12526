//! CLI command definitions for sonoma
//!
//! This module defines the CLI structure using clap's derive macros.
//! The main entry point is the `Cli` struct which contains subcommands.

pub mod agents;
pub mod config;

use agents::AgentsCommand;
use clap::{Parser, Subcommand};
use config::ConfigCommand;

/// Sonoma agent deployment CLI
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(short, long, default_value = "2", global = true)]
    pub log: String,

    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Inspect and modify the stored configuration
    #[command(subcommand)]
    Config(ConfigCommand),

    /// Read and record agent deployment state
    #[command(subcommand)]
    Agents(AgentsCommand),
}

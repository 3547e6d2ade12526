//! `config` subcommand for sonoma CLI
//!
//! Thin handlers over [`ConfigStore`]; every mutation is persisted by the store
//! before the handler returns.

use crate::config::{ConfigStore, parse_project};
use crate::format::{OutputFormat, parse_value, render};
use anyhow::{Context, Result, bail};
use clap::{Args, Subcommand};
use std::io::Write;
use std::path::PathBuf;

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print a value, or the whole configuration when no path is given
    Get(GetArgs),

    /// Store a value at a dotted path, or merge a whole file
    Set(SetArgs),

    /// Remove a value, or clear everything when no path is given
    Reset {
        /// Dotted path to remove (e.g. agents.alpha.deployment)
        path: Option<String>,
    },

    /// Clear the entire configuration
    ResetAll {
        /// Confirm that all stored configuration should be erased
        #[arg(long)]
        yes: bool,
    },

    /// Show where configuration is read from and written to
    Path,
}

/// Arguments for `config get`
#[derive(Args, Debug)]
pub struct GetArgs {
    /// Dotted path (e.g. auth.apiKey)
    pub path: Option<String>,

    /// Output format for non-string values
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,
}

/// Arguments for `config set`
#[derive(Args, Debug)]
pub struct SetArgs {
    /// Dotted path (e.g. network)
    #[arg(required_unless_present = "file", conflicts_with = "file")]
    pub path: Option<String>,

    /// Value to store; parsed as JSON when valid, otherwise stored as a string
    #[arg(required_unless_present = "file")]
    pub value: Option<String>,

    /// JSON or YAML file to deep-merge into the configuration
    #[arg(long, value_name = "FILE")]
    pub file: Option<PathBuf>,
}

/// Execute a `config` subcommand, writing any output to `out`.
pub async fn run(store: &mut ConfigStore, command: ConfigCommand, out: &mut impl Write) -> Result<()> {
    match command {
        ConfigCommand::Get(args) => {
            if let Some(value) = store.get(args.path.as_deref()).await? {
                writeln!(out, "{}", render(&value, args.format)?)?;
            }
        }
        ConfigCommand::Set(args) => match (args.file, args.path, args.value) {
            (Some(file), _, _) => {
                let content = tokio::fs::read_to_string(&file)
                    .await
                    .with_context(|| format!("Failed to read {}", file.display()))?;
                let tree = parse_project(&file, &content)?;
                store.set_tree(tree).await?;
            }
            (None, Some(path), Some(value)) => {
                store.set(&path, parse_value(&value)).await?;
            }
            _ => bail!("either PATH and VALUE or --file is required"),
        },
        ConfigCommand::Reset { path } => {
            store.reset(path.as_deref()).await?;
        }
        ConfigCommand::ResetAll { yes } => {
            if !yes {
                bail!("refusing to erase all configuration without --yes");
            }
            store.reset_all().await?;
            writeln!(out, "Configuration cleared")?;
        }
        ConfigCommand::Path => {
            store.load().await?;
            writeln!(out, "config: {}", store.config_file().display())?;
            match store.project_file() {
                Some(project) => writeln!(out, "project: {}", project.display())?,
                None => writeln!(out, "project: (none)")?,
            }
        }
    }
    Ok(())
}

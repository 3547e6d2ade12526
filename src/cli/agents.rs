//! `agents` subcommand for sonoma CLI
//!
//! Deployment state lives under `agents.<name>.deployment` in the config tree.

use crate::config::ConfigStore;
use anyhow::{Result, bail};
use clap::Subcommand;
use serde_json::Value;
use std::io::Write;

#[derive(Subcommand, Debug)]
pub enum AgentsCommand {
    /// Print the recorded deployment status of an agent
    Status {
        /// Agent name
        name: String,
    },

    /// Record the deployment status of an agent
    SetStatus {
        /// Agent name
        name: String,
        /// New status (e.g. deployed, failed)
        status: String,
    },
}

/// Dotted path of an agent's deployment status.
pub fn status_path(name: &str) -> Result<String> {
    if name.is_empty() || name.contains('.') {
        bail!("invalid agent name {name:?}: must be non-empty and contain no '.'");
    }
    Ok(format!("agents.{name}.deployment.status"))
}

/// Execute an `agents` subcommand, writing any output to `out`.
pub async fn run(store: &mut ConfigStore, command: AgentsCommand, out: &mut impl Write) -> Result<()> {
    match command {
        AgentsCommand::Status { name } => {
            let path = status_path(&name)?;
            match store.get(Some(&path)).await? {
                Some(Value::String(status)) => writeln!(out, "{name}: {status}")?,
                Some(other) => writeln!(out, "{name}: {other}")?,
                None => writeln!(out, "{name}: unknown")?,
            }
        }
        AgentsCommand::SetStatus { name, status } => {
            let path = status_path(&name)?;
            store.set(&path, Value::String(status)).await?;
        }
    }
    Ok(())
}

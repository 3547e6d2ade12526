//! Environment variable overlay.
//!
//! Only the variables listed in [`ENV_REGISTRY`] are ever read. Each present
//! variable is coerced and placed at its mapped path in a fresh tree.

use super::ConfigTree;
use super::path::{self, ConfigPath};
use serde_json::{Number, Value};
use std::collections::HashMap;
use tracing::{debug, warn};

/// How the raw text of a variable becomes a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coercion {
    /// Keep the raw string.
    Text,
    /// `"true"`/`"false"` to bool, numeric text to a number, otherwise string.
    Inferred,
}

/// A registered environment variable and the path it populates.
#[derive(Debug, Clone, Copy)]
pub struct EnvBinding {
    pub var: &'static str,
    pub path: &'static str,
    pub coercion: Coercion,
}

/// Environment variables that feed the configuration tree.
pub const ENV_REGISTRY: &[EnvBinding] = &[
    EnvBinding {
        var: "SONOMA_API_KEY",
        path: "auth.apiKey",
        coercion: Coercion::Text,
    },
    EnvBinding {
        var: "SONOMA_NETWORK",
        path: "network",
        coercion: Coercion::Text,
    },
    EnvBinding {
        var: "SONOMA_DEBUG",
        path: "debug",
        coercion: Coercion::Inferred,
    },
];

/// Coerce environment text into a typed value.
pub fn coerce(raw: &str) -> Value {
    match raw {
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        _ => {}
    }
    if let Ok(n) = raw.parse::<i64>() {
        return Value::Number(n.into());
    }
    if let Ok(n) = raw.parse::<u64>() {
        return Value::Number(n.into());
    }
    if let Some(n) = raw.parse::<f64>().ok().and_then(Number::from_f64) {
        return Value::Number(n);
    }
    Value::String(raw.to_string())
}

impl Coercion {
    fn apply(self, raw: &str) -> Value {
        match self {
            Coercion::Text => Value::String(raw.to_string()),
            Coercion::Inferred => coerce(raw),
        }
    }
}

type Lookup = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Builds the environment-derived configuration fragment.
pub struct EnvOverlay {
    lookup: Lookup,
}

impl EnvOverlay {
    /// Read variables from the process environment.
    pub fn from_process() -> Self {
        Self {
            lookup: Box::new(|name: &str| std::env::var(name).ok()),
        }
    }

    /// Read variables from a fixed set instead of the process environment.
    pub fn from_vars<K, V>(vars: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let vars: HashMap<String, String> = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            lookup: Box::new(move |name: &str| vars.get(name).cloned()),
        }
    }

    /// An overlay that sees no variables.
    pub fn empty() -> Self {
        Self::from_vars(std::iter::empty::<(String, String)>())
    }

    /// Build the tree fragment for every registered variable that is set.
    pub fn build(&self) -> ConfigTree {
        let mut tree = ConfigTree::new();
        for binding in ENV_REGISTRY {
            let Some(raw) = (self.lookup)(binding.var) else {
                continue;
            };
            let path = match ConfigPath::parse(binding.path) {
                Ok(path) => path,
                Err(e) => {
                    warn!(var = binding.var, error = %e, "Skipping environment binding");
                    continue;
                }
            };
            debug!(var = binding.var, path = binding.path, "Applying environment override");
            path::set(&mut tree, &path, binding.coercion.apply(&raw));
        }
        tree
    }
}

impl Default for EnvOverlay {
    fn default() -> Self {
        Self::from_process()
    }
}

impl std::fmt::Debug for EnvOverlay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnvOverlay").finish_non_exhaustive()
    }
}

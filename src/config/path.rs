//! Dotted-path addressing over a configuration tree.
//!
//! A path like `agents.alpha.deployment.status` addresses a location inside nested
//! objects. There is no escape syntax: a key containing a literal `.` cannot be
//! addressed.

use super::ConfigTree;
use crate::error::{ConfigError, ConfigResult};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// A parsed, non-empty sequence of non-empty key segments.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConfigPath {
    segments: Vec<String>,
}

impl ConfigPath {
    /// Parse a dot-separated path.
    ///
    /// Rejects empty input and any empty segment (`a..b`, `.a`, `a.`).
    pub fn parse(raw: &str) -> ConfigResult<Self> {
        if raw.is_empty() {
            return Err(ConfigError::invalid_path(raw));
        }
        let segments: Vec<String> = raw.split('.').map(str::to_string).collect();
        if segments.iter().any(String::is_empty) {
            return Err(ConfigError::invalid_path(raw));
        }
        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Split into the parent segments and the final key.
    fn split_last(&self) -> (&[String], &str) {
        // parse() guarantees at least one segment
        let (last, parents) = self
            .segments
            .split_last()
            .map(|(last, parents)| (last.as_str(), parents))
            .unwrap_or(("", &[]));
        (parents, last)
    }
}

impl FromStr for ConfigPath {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ConfigPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}

/// Look up the value at `path`, or `None` if any segment fails to resolve.
pub fn get<'a>(tree: &'a ConfigTree, path: &ConfigPath) -> Option<&'a Value> {
    let (parents, last) = path.split_last();
    let mut current = tree;
    for segment in parents {
        match current.get(segment) {
            Some(Value::Object(child)) => current = child,
            _ => return None,
        }
    }
    current.get(last)
}

/// Assign `value` at `path`, creating intermediate objects as needed.
///
/// A non-object value found at an intermediate segment is replaced by an empty
/// object.
pub fn set<'a>(tree: &'a mut ConfigTree, path: &ConfigPath, value: Value) -> &'a mut ConfigTree {
    let (parents, last) = path.split_last();
    let mut current: &mut ConfigTree = &mut *tree;
    for segment in parents {
        let slot = current
            .entry(segment.clone())
            .or_insert_with(|| Value::Object(Map::new()));
        if !slot.is_object() {
            *slot = Value::Object(Map::new());
        }
        current = match slot {
            Value::Object(child) => child,
            _ => unreachable!("slot was just replaced with an object"),
        };
    }
    current.insert(last.to_string(), value);
    tree
}

/// Remove the value at `path`.
///
/// Unresolvable intermediate segments make this a no-op. Returns the removed
/// value, if any.
pub fn delete(tree: &mut ConfigTree, path: &ConfigPath) -> Option<Value> {
    let (parents, last) = path.split_last();
    let mut current = tree;
    for segment in parents {
        match current.get_mut(segment) {
            Some(Value::Object(child)) => current = child,
            _ => return None,
        }
    }
    current.remove(last)
}

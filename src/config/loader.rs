//! Configuration sources and their locations.
//!
//! Each source yields a tree (possibly empty). Problems while reading a source
//! are logged and degrade to an empty contribution; they never fail a load.

use super::ConfigTree;
use crate::error::ConfigError;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Directory under the home directory holding the persisted config.
pub const USER_DIR_NAME: &str = ".sonoma";

/// File name of the persisted config inside the user directory.
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Project config file names, checked in order within each directory.
pub const PROJECT_FILE_NAMES: &[&str] = &[
    "sonoma.config.json",
    ".sonomarc.json",
    ".sonomarc.yaml",
    ".sonomarc.yml",
    ".sonomarc",
];

/// Configuration source, ordered from lowest to highest precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConfigSource {
    /// `~/.sonoma/config.json`
    PersistedFile = 0,
    /// First project file found walking up from the working directory
    DiscoveredProject = 1,
    /// Registered environment variables
    Environment = 2,
    /// Explicit `set()` calls during this process
    RuntimeOverride = 3,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::PersistedFile => write!(f, "persisted-file"),
            ConfigSource::DiscoveredProject => write!(f, "discovered-project"),
            ConfigSource::Environment => write!(f, "environment"),
            ConfigSource::RuntimeOverride => write!(f, "runtime-override"),
        }
    }
}

/// Locations of the file-backed sources.
#[derive(Debug, Clone)]
pub struct ConfigPaths {
    /// Per-user directory holding the persisted config
    pub user_dir: Option<PathBuf>,
    /// Directory the project search starts from
    pub search_start: Option<PathBuf>,
}

impl Default for ConfigPaths {
    fn default() -> Self {
        Self::discover()
    }
}

impl ConfigPaths {
    /// Discover paths from the environment and defaults.
    pub fn discover() -> Self {
        // User dir: SONOMA_CONFIG_DIR or ~/.sonoma
        let user_dir = std::env::var("SONOMA_CONFIG_DIR")
            .ok()
            .filter(|dir| !dir.is_empty())
            .map(PathBuf::from)
            .or_else(|| dirs::home_dir().map(|h| h.join(USER_DIR_NAME)));

        let search_start = std::env::current_dir().ok();

        Self {
            user_dir,
            search_start,
        }
    }

    /// Create paths with explicit directories.
    pub fn with_dirs(user_dir: Option<PathBuf>, search_start: Option<PathBuf>) -> Self {
        Self {
            user_dir,
            search_start,
        }
    }

    /// Path of the persisted config file.
    ///
    /// Falls back to a relative `.sonoma/config.json` when no home directory
    /// can be determined.
    pub fn config_file(&self) -> PathBuf {
        self.user_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(USER_DIR_NAME))
            .join(CONFIG_FILE_NAME)
    }
}

/// Parse persisted-file text. `None` content yields an empty tree.
///
/// Malformed content is returned as an error for the caller to log.
pub fn parse_persisted(path: &Path, content: Option<&str>) -> Result<ConfigTree, ConfigError> {
    let Some(content) = content else {
        return Ok(ConfigTree::new());
    };
    if content.trim().is_empty() {
        return Ok(ConfigTree::new());
    }
    let value: Value =
        serde_json::from_str(content).map_err(|e| ConfigError::malformed(path, e))?;
    into_tree(path, value)
}

fn into_tree(path: &Path, value: Value) -> Result<ConfigTree, ConfigError> {
    match value {
        Value::Object(tree) => Ok(tree),
        Value::Null => Ok(ConfigTree::new()),
        other => Err(ConfigError::malformed(
            path,
            format!("expected an object at the top level, found {}", kind(&other)),
        )),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Locates the project config by walking up from a start directory.
#[derive(Debug, Clone, Default)]
pub struct ProjectDiscovery {
    start: Option<PathBuf>,
}

impl ProjectDiscovery {
    pub fn new(start: Option<PathBuf>) -> Self {
        Self { start }
    }

    /// Disable discovery entirely.
    pub fn disabled() -> Self {
        Self { start: None }
    }

    /// The first recognised config file found, nearest directory first.
    pub fn find(&self) -> Option<PathBuf> {
        let start = self.start.as_deref()?;
        for dir in start.ancestors() {
            for name in PROJECT_FILE_NAMES {
                let candidate = dir.join(name);
                if candidate.is_file() {
                    debug!(path = %candidate.display(), "Discovered project config");
                    return Some(candidate);
                }
            }
        }
        None
    }

    /// Read and parse the discovered project config.
    ///
    /// Absent, unreadable or malformed files all yield an empty tree.
    pub async fn load(&self) -> (ConfigTree, Option<PathBuf>) {
        let Some(path) = self.find() else {
            debug!("No project config found");
            return (ConfigTree::new(), None);
        };

        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to read project config, ignoring");
                return (ConfigTree::new(), Some(path));
            }
        };

        match parse_project(&path, &content) {
            Ok(tree) => (tree, Some(path)),
            Err(e) => {
                warn!(error = %e, "Ignoring malformed project config");
                (ConfigTree::new(), Some(path))
            }
        }
    }
}

/// Parse a project config file, choosing the format from its extension.
///
/// `.json` is parsed as JSON; everything else as YAML, which also accepts
/// JSON documents.
pub fn parse_project(path: &Path, content: &str) -> Result<ConfigTree, ConfigError> {
    if content.trim().is_empty() {
        return Ok(ConfigTree::new());
    }
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let value: Value = if is_json {
        serde_json::from_str(content).map_err(|e| ConfigError::malformed(path, e))?
    } else {
        serde_yaml::from_str(content).map_err(|e| ConfigError::malformed(path, e))?
    };
    into_tree(path, value)
}

//! Layered configuration system.
//!
//! Merges four sources into one tree, lowest precedence first:
//! 1. **Persisted file** - `~/.sonoma/config.json`
//! 2. **Discovered project** - first `sonoma.config.json` / `.sonomarc*` found
//!    walking up from the working directory
//! 3. **Environment** - the registered `SONOMA_*` variables
//! 4. **Runtime** - explicit `set()` calls, written through to the persisted file
//!
//! ## Merge Strategy
//! - Objects merge key by key, higher precedence wins
//! - Arrays and scalars are replaced wholesale
//!
//! ## Environment Variables
//! - `SONOMA_API_KEY` - `auth.apiKey`
//! - `SONOMA_NETWORK` - `network`
//! - `SONOMA_DEBUG` - `debug` (coerced to a boolean)
//! - `SONOMA_CONFIG_DIR` - persisted config directory (default: `~/.sonoma`)

pub mod env;
mod loader;
mod merge;
pub mod path;
mod storage;
mod store;

/// A nested configuration object.
pub type ConfigTree = serde_json::Map<String, serde_json::Value>;

pub use env::{Coercion, ENV_REGISTRY, EnvBinding, EnvOverlay};
pub use loader::{
    CONFIG_FILE_NAME, ConfigPaths, ConfigSource, PROJECT_FILE_NAMES, ProjectDiscovery,
    USER_DIR_NAME, parse_project,
};
pub use merge::{merge, merge_all};
pub use path::ConfigPath;
pub use storage::{FileStorage, Storage};
pub use store::{ConfigStore, StoreState};

//! The process-wide configuration store.
//!
//! Sources are merged in ascending precedence:
//! persisted file < discovered project < environment < runtime `set()`.
//!
//! Every mutation is written through to storage before it returns, so there is
//! no dirty state and no flush on exit. Runtime writes land in the persisted
//! file and come back as part of that source on the next load.

use super::env::EnvOverlay;
use super::loader::{self, ConfigPaths, ConfigSource, ProjectDiscovery};
use super::merge::{merge, merge_all};
use super::path::{self, ConfigPath};
use super::storage::{FileStorage, Storage};
use super::ConfigTree;
use crate::error::ConfigResult;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Lifecycle of a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreState {
    Unloaded,
    Loaded,
}

/// Merged configuration with dotted-path access and write-through persistence.
pub struct ConfigStore {
    storage: Box<dyn Storage>,
    project: ProjectDiscovery,
    env: EnvOverlay,
    tree: Option<ConfigTree>,
    project_file: Option<PathBuf>,
}

impl ConfigStore {
    /// Create an unloaded store from its collaborators.
    pub fn new(storage: impl Storage + 'static, project: ProjectDiscovery, env: EnvOverlay) -> Self {
        Self {
            storage: Box::new(storage),
            project,
            env,
            tree: None,
            project_file: None,
        }
    }

    /// Create a store backed by the standard file locations and the process
    /// environment.
    pub fn from_paths(paths: &ConfigPaths) -> Self {
        Self::new(
            FileStorage::new(paths.config_file()),
            ProjectDiscovery::new(paths.search_start.clone()),
            EnvOverlay::from_process(),
        )
    }

    pub fn state(&self) -> StoreState {
        if self.tree.is_some() {
            StoreState::Loaded
        } else {
            StoreState::Unloaded
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.state() == StoreState::Loaded
    }

    /// Location of the persisted config.
    pub fn config_file(&self) -> &Path {
        self.storage.location()
    }

    /// Project config that contributed to the last load, if one was found.
    pub fn project_file(&self) -> Option<&Path> {
        self.project_file.as_deref()
    }

    /// Load and merge all sources. Only the first call does any work.
    ///
    /// Never fails: each source degrades to an empty tree on error.
    pub async fn load(&mut self) -> ConfigResult<&ConfigTree> {
        if self.tree.is_none() {
            let merged = self.load_sources().await;
            self.tree = Some(merged);
        }
        Ok(&*self.loaded_mut())
    }

    async fn load_sources(&mut self) -> ConfigTree {
        let persisted = self.load_persisted().await;
        let (project, project_file) = self.project.load().await;
        let environment = self.env.build();

        for (source, tree) in [
            (ConfigSource::PersistedFile, &persisted),
            (ConfigSource::DiscoveredProject, &project),
            (ConfigSource::Environment, &environment),
        ] {
            debug!(%source, keys = tree.len(), "Loaded config source");
        }

        self.project_file = project_file;
        let merged = merge_all([&persisted, &project, &environment]);
        info!(
            path = %self.storage.location().display(),
            keys = merged.len(),
            "Configuration loaded"
        );
        merged
    }

    async fn load_persisted(&self) -> ConfigTree {
        let location = self.storage.location();
        let content = match self.storage.read().await {
            Ok(content) => content,
            Err(e) => {
                warn!(path = %location.display(), error = %e, "Failed to read config, treating as empty");
                return ConfigTree::new();
            }
        };
        loader::parse_persisted(location, content.as_deref()).unwrap_or_else(|e| {
            warn!(error = %e, "Treating malformed config as empty");
            ConfigTree::new()
        })
    }

    fn loaded_mut(&mut self) -> &mut ConfigTree {
        self.tree.get_or_insert_with(ConfigTree::new)
    }

    /// The whole merged tree, borrowed immutably.
    ///
    /// All writes go through `set`, `set_tree` and `reset`.
    pub async fn tree(&mut self) -> ConfigResult<&ConfigTree> {
        self.load().await
    }

    /// Read a value.
    ///
    /// `None` returns the whole tree as an object. A path that does not resolve
    /// returns `Ok(None)`.
    pub async fn get(&mut self, path: Option<&str>) -> ConfigResult<Option<Value>> {
        let path = path.map(ConfigPath::parse).transpose()?;
        let tree = self.load().await?;
        Ok(match path {
            None => Some(Value::Object(tree.clone())),
            Some(path) => path::get(tree, &path).cloned(),
        })
    }

    /// Read a value and deserialize it.
    pub async fn get_as<T: serde::de::DeserializeOwned>(
        &mut self,
        path: &str,
    ) -> ConfigResult<Option<T>> {
        match self.get(Some(path)).await? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    /// Assign `value` at a dotted path, then persist.
    pub async fn set(&mut self, path: &str, value: Value) -> ConfigResult<()> {
        let path = ConfigPath::parse(path)?;
        self.load().await?;
        path::set(self.loaded_mut(), &path, value);
        debug!(%path, "Set config value");
        self.persist().await
    }

    /// Deep-merge `overlay` into the current tree, then persist.
    pub async fn set_tree(&mut self, overlay: ConfigTree) -> ConfigResult<()> {
        let current = self.load().await?;
        let merged = merge(current, &overlay);
        debug!(keys = overlay.len(), "Merged config tree");
        self.tree = Some(merged);
        self.persist().await
    }

    /// Remove the value at a path, or clear everything when `path` is `None`.
    /// Persists either way.
    pub async fn reset(&mut self, path: Option<&str>) -> ConfigResult<()> {
        let path = path.map(ConfigPath::parse).transpose()?;
        match path {
            Some(path) => {
                self.load().await?;
                let removed = path::delete(self.loaded_mut(), &path);
                debug!(%path, removed = removed.is_some(), "Reset config value");
            }
            None => {
                self.tree = Some(ConfigTree::new());
                info!("Reset entire configuration");
            }
        }
        self.persist().await
    }

    /// Clear the whole configuration. Same as `reset(None)`.
    pub async fn reset_all(&mut self) -> ConfigResult<()> {
        self.reset(None).await
    }

    /// Write the current tree to storage as pretty-printed JSON.
    pub async fn persist(&self) -> ConfigResult<()> {
        let empty = ConfigTree::new();
        let tree = self.tree.as_ref().unwrap_or(&empty);
        let mut contents = serde_json::to_string_pretty(tree)?;
        contents.push('\n');
        self.storage.write(&contents).await
    }
}

impl std::fmt::Debug for ConfigStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigStore")
            .field("location", &self.storage.location())
            .field("state", &self.state())
            .field("project_file", &self.project_file)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    /// In-memory storage that records every write.
    #[derive(Clone, Default)]
    struct MemoryStorage {
        content: Arc<Mutex<Option<String>>>,
        writes: Arc<Mutex<usize>>,
        fail_writes: bool,
    }

    impl MemoryStorage {
        fn with_content(content: &str) -> Self {
            let storage = Self::default();
            *storage.content.lock().unwrap() = Some(content.to_string());
            storage
        }

        fn writes(&self) -> usize {
            *self.writes.lock().unwrap()
        }

        fn stored(&self) -> Value {
            let content = self.content.lock().unwrap().clone().unwrap_or_default();
            serde_json::from_str(&content).unwrap()
        }
    }

    #[async_trait]
    impl Storage for MemoryStorage {
        async fn read(&self) -> std::io::Result<Option<String>> {
            Ok(self.content.lock().unwrap().clone())
        }

        async fn write(&self, contents: &str) -> ConfigResult<()> {
            if self.fail_writes {
                return Err(ConfigError::persist(
                    "memory",
                    std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
                ));
            }
            *self.content.lock().unwrap() = Some(contents.to_string());
            *self.writes.lock().unwrap() += 1;
            Ok(())
        }

        fn location(&self) -> &Path {
            Path::new("memory")
        }
    }

    fn store(storage: &MemoryStorage, env: EnvOverlay) -> ConfigStore {
        ConfigStore::new(storage.clone(), ProjectDiscovery::disabled(), env)
    }

    #[tokio::test]
    async fn test_load_is_lazy_and_idempotent() {
        let storage = MemoryStorage::with_content(r#"{"network": "devnet"}"#);
        let mut store = store(&storage, EnvOverlay::empty());
        assert_eq!(store.state(), StoreState::Unloaded);

        store.load().await.unwrap();
        assert!(store.is_loaded());

        // Later changes to storage are not re-read
        *storage.content.lock().unwrap() = Some(r#"{"network": "other"}"#.to_string());
        store.load().await.unwrap();
        assert_eq!(store.get(Some("network")).await.unwrap(), Some(json!("devnet")));
        assert_eq!(storage.writes(), 0);
    }

    #[tokio::test]
    async fn test_set_get_reset_paths() {
        let storage = MemoryStorage::default();
        let mut store = store(&storage, EnvOverlay::empty());

        store.set("a.b.c", json!(5)).await.unwrap();
        assert_eq!(store.get(None).await.unwrap(), Some(json!({"a": {"b": {"c": 5}}})));
        assert_eq!(store.get(Some("a.b.c")).await.unwrap(), Some(json!(5)));
        assert_eq!(store.get(Some("a.b.x")).await.unwrap(), None);

        store.reset(Some("a.b")).await.unwrap();
        assert_eq!(store.get(Some("a.b")).await.unwrap(), None);
        assert_eq!(store.get(Some("a")).await.unwrap(), Some(json!({})));

        assert_eq!(storage.writes(), 2);
        assert_eq!(storage.stored(), json!({"a": {}}));
    }

    #[tokio::test]
    async fn test_env_debug_is_boolean() {
        let storage = MemoryStorage::default();
        let mut store = store(&storage, EnvOverlay::from_vars([("SONOMA_DEBUG", "true")]));
        assert_eq!(store.get(Some("debug")).await.unwrap(), Some(json!(true)));
    }

    #[tokio::test]
    async fn test_env_outranks_persisted() {
        let storage = MemoryStorage::with_content(r#"{"network": "devnet", "debug": false}"#);
        let mut store = store(
            &storage,
            EnvOverlay::from_vars([("SONOMA_NETWORK", "mainnet")]),
        );
        assert_eq!(store.get(Some("network")).await.unwrap(), Some(json!("mainnet")));
        assert_eq!(store.get(Some("debug")).await.unwrap(), Some(json!(false)));
    }

    #[tokio::test]
    async fn test_runtime_set_overrides_env_in_memory() {
        let storage = MemoryStorage::default();
        let mut store = store(
            &storage,
            EnvOverlay::from_vars([("SONOMA_NETWORK", "mainnet")]),
        );
        store.set("network", json!("testnet")).await.unwrap();
        assert_eq!(store.get(Some("network")).await.unwrap(), Some(json!("testnet")));
    }

    #[tokio::test]
    async fn test_set_tree_deep_merges() {
        let storage = MemoryStorage::with_content(r#"{"auth": {"apiKey": "k", "user": "u"}}"#);
        let mut store = store(&storage, EnvOverlay::empty());

        let overlay = match json!({"auth": {"apiKey": "new"}, "tags": ["x"]}) {
            Value::Object(map) => map,
            _ => unreachable!(),
        };
        store.set_tree(overlay).await.unwrap();

        assert_eq!(
            store.get(None).await.unwrap(),
            Some(json!({"auth": {"apiKey": "new", "user": "u"}, "tags": ["x"]}))
        );
        assert_eq!(storage.writes(), 1);
    }

    #[tokio::test]
    async fn test_reset_all_persists_once() {
        let storage = MemoryStorage::with_content(r#"{"network": "devnet"}"#);
        let mut store = store(&storage, EnvOverlay::empty());
        store.load().await.unwrap();

        store.reset_all().await.unwrap();

        assert_eq!(store.get(None).await.unwrap(), Some(json!({})));
        assert_eq!(storage.writes(), 1);
        assert_eq!(storage.stored(), json!({}));
    }

    #[tokio::test]
    async fn test_malformed_persisted_is_empty() {
        let storage = MemoryStorage::with_content("{definitely not json");
        let mut store = store(&storage, EnvOverlay::empty());
        assert_eq!(store.get(None).await.unwrap(), Some(json!({})));
    }

    #[tokio::test]
    async fn test_invalid_path_rejected_before_load() {
        let storage = MemoryStorage::default();
        let mut store = store(&storage, EnvOverlay::empty());

        assert!(matches!(
            store.get(Some("")).await,
            Err(ConfigError::InvalidPath(_))
        ));
        assert!(matches!(
            store.set("a..b", json!(1)).await,
            Err(ConfigError::InvalidPath(_))
        ));
        assert!(!store.is_loaded());
        assert_eq!(storage.writes(), 0);
    }

    #[tokio::test]
    async fn test_persist_failure_propagates() {
        let storage = MemoryStorage {
            fail_writes: true,
            ..Default::default()
        };
        let mut store = store(&storage, EnvOverlay::empty());
        let err = store.set("network", json!("devnet")).await.unwrap_err();
        assert!(matches!(err, ConfigError::Persist { .. }));
    }

    #[tokio::test]
    async fn test_get_as_deserializes() {
        let storage = MemoryStorage::with_content(r#"{"agents": {"a": {"replicas": 3}}}"#);
        let mut store = store(&storage, EnvOverlay::empty());
        let replicas: Option<u32> = store.get_as("agents.a.replicas").await.unwrap();
        assert_eq!(replicas, Some(3));
        let missing: Option<u32> = store.get_as("agents.b.replicas").await.unwrap();
        assert_eq!(missing, None);
    }
}

//! Durable storage for the persisted configuration file.

use crate::error::{ConfigError, ConfigResult};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Backing store for the persisted-file source.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Read the stored text. `Ok(None)` means nothing has been stored yet.
    async fn read(&self) -> std::io::Result<Option<String>>;

    /// Replace the stored text.
    async fn write(&self, contents: &str) -> ConfigResult<()>;

    /// Where the data lives, for logging and error messages.
    fn location(&self) -> &Path;
}

/// Stores the configuration as a single file on disk.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "config".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl Storage for FileStorage {
    async fn read(&self) -> std::io::Result<Option<String>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Writes a sibling temp file and renames it over the target, creating
    /// parent directories first.
    async fn write(&self, contents: &str) -> ConfigResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| ConfigError::persist(parent, e))?;
        }

        let temp = self.temp_path();
        tokio::fs::write(&temp, contents)
            .await
            .map_err(|e| ConfigError::persist(&temp, e))?;
        if let Err(e) = tokio::fs::rename(&temp, &self.path).await {
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(ConfigError::persist(&self.path, e));
        }

        debug!(path = %self.path.display(), bytes = contents.len(), "Persisted config");
        Ok(())
    }

    fn location(&self) -> &Path {
        &self.path
    }
}

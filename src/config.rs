use crate::{
    domain::project::StatusColumn,
    error::{Result, TaskboardError},
    storage::{file_storage::FileStorage, Storage},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Which backend holds the data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum StorageBackend {
    /// JSON documents under `<root>/.taskboard`
    File { root: PathBuf },
    /// Single SQLite database file; needs the `sqlite-storage` feature
    Sqlite { path: PathBuf },
}

impl Default for StorageBackend {
    fn default() -> Self {
        Self::File {
            root: PathBuf::from("."),
        }
    }
}

/// Library configuration, usually read from `config.json`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageBackend,
    /// Columns given to newly created projects
    #[serde(default = "StatusColumn::defaults")]
    pub default_statuses: Vec<StatusColumn>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage: StorageBackend::default(),
            default_statuses: StatusColumn::defaults(),
        }
    }
}

impl Config {
    pub const FILE_NAME: &'static str = "config.json";

    /// Reads a config file, falling back to defaults when it does not exist
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let contents = tokio::fs::read_to_string(path).await?;
        let config: Config = serde_json::from_str(&contents)
            .map_err(|e| TaskboardError::ConfigError(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    /// Status keys must be present and unique
    pub fn validate(&self) -> Result<()> {
        if self.default_statuses.is_empty() {
            return Err(TaskboardError::ConfigError(
                "default_statuses must not be empty".to_string(),
            ));
        }
        for (idx, col) in self.default_statuses.iter().enumerate() {
            if col.id.trim().is_empty() {
                return Err(TaskboardError::ConfigError(
                    "status ids must not be blank".to_string(),
                ));
            }
            if self.default_statuses[..idx].iter().any(|c| c.id == col.id) {
                return Err(TaskboardError::ConfigError(format!(
                    "duplicate status id: {}",
                    col.id
                )));
            }
        }
        Ok(())
    }

    /// Opens and initializes the configured backend
    pub async fn open_storage(&self) -> Result<Box<dyn Storage>> {
        let storage: Box<dyn Storage> = match &self.storage {
            StorageBackend::File { root } => Box::new(FileStorage::new(root)),
            #[cfg(feature = "sqlite-storage")]
            StorageBackend::Sqlite { path } => Box::new(
                crate::storage::sqlite_storage::SqliteStorage::open(path)?,
            ),
            #[cfg(not(feature = "sqlite-storage"))]
            StorageBackend::Sqlite { .. } => {
                return Err(TaskboardError::ConfigError(
                    "sqlite backend requires the sqlite-storage feature".to_string(),
                ))
            }
        };

        if !storage.is_initialized().await {
            tracing::info!(backend = ?self.storage, "initializing storage");
            storage.initialize().await?;
        }
        Ok(storage)
    }
}

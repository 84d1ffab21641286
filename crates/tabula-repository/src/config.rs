//! Repository configuration types

use crate::error::{RepositoryError, RepositoryResult};
use crate::file_system::FileSystemStore;
use crate::memory::MemoryStore;
use crate::store::ModelStore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Repository source type
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepositorySource {
    /// Model documents in a directory tree
    #[default]
    FileSystem,
    /// Documents held in memory (for testing or embedded use)
    Memory,
}

/// Repository configuration
///
/// # Examples
///
/// ```rust
/// use tabula_repository::RepositoryConfig;
///
/// // File system repository
/// let config = RepositoryConfig::file_system("models");
///
/// // Memory repository (for testing)
/// let config = RepositoryConfig::memory();
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryConfig {
    /// Configuration source type
    #[serde(default)]
    pub source: RepositorySource,

    /// Root directory (required for FileSystem source)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_path: Option<String>,

    /// Take a backup of a document before overwriting it
    #[serde(default = "default_backups")]
    pub backups: bool,
}

fn default_backups() -> bool {
    true
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            source: RepositorySource::default(),
            base_path: None,
            backups: default_backups(),
        }
    }
}

impl RepositoryConfig {
    /// Create a file system repository configuration
    pub fn file_system(path: impl Into<String>) -> Self {
        Self {
            source: RepositorySource::FileSystem,
            base_path: Some(path.into()),
            ..Self::default()
        }
    }

    /// Create a memory repository configuration
    pub fn memory() -> Self {
        Self {
            source: RepositorySource::Memory,
            base_path: None,
            ..Self::default()
        }
    }

    pub fn with_backups(mut self, backups: bool) -> Self {
        self.backups = backups;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> RepositoryResult<()> {
        match self.source {
            RepositorySource::FileSystem if self.base_path.is_none() => Err(RepositoryError::Config(
                "base_path required for file_system source".to_string(),
            )),
            _ => Ok(()),
        }
    }

    /// Open the configured store
    pub fn open_store(&self) -> RepositoryResult<Arc<dyn ModelStore>> {
        self.validate()?;
        match self.source {
            RepositorySource::FileSystem => {
                let path = self.base_path.as_deref().unwrap_or_default();
                Ok(Arc::new(FileSystemStore::new(path)?))
            }
            RepositorySource::Memory => Ok(Arc::new(MemoryStore::new())),
        }
    }
}

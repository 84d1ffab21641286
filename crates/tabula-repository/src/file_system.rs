//! File system based model store

use async_trait::async_trait;
use path_absolutize::Absolutize;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::error::{RepositoryError, RepositoryResult};
use crate::store::{ModelStore, StoredDocument};

/// Extension of model documents
const MODEL_EXTENSION: &str = "dmn";

/// File system based model store
///
/// Discovers `*.dmn` files anywhere under the root directory. Locations are
/// absolute file paths.
#[derive(Debug, Clone)]
pub struct FileSystemStore {
    root_path: PathBuf,
}

impl FileSystemStore {
    /// Create a new file system store
    ///
    /// # Example
    /// ```no_run
    /// use tabula_repository::FileSystemStore;
    ///
    /// let store = FileSystemStore::new("models").unwrap();
    /// ```
    pub fn new<P: AsRef<Path>>(root_path: P) -> RepositoryResult<Self> {
        let path = root_path.as_ref();

        // Validate that the path exists
        if !path.exists() {
            return Err(RepositoryError::InvalidPath {
                path: path.to_path_buf(),
            });
        }

        let abs_path = path
            .absolutize()
            .map_err(|e| RepositoryError::Other(format!("Failed to absolutize path: {}", e)))?
            .to_path_buf();

        Ok(Self {
            root_path: abs_path,
        })
    }

    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    /// Recursively collect model documents, sorted by path within each directory
    async fn collect(&self, dir: &Path, found: &mut Vec<PathBuf>) -> RepositoryResult<()> {
        let mut entries = fs::read_dir(dir).await?;
        let mut paths = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            paths.push(entry.path());
        }
        paths.sort();

        for path in paths {
            if path.is_dir() {
                Box::pin(self.collect(&path, found)).await?;
            } else if path.extension().and_then(|s| s.to_str()) == Some(MODEL_EXTENSION) {
                found.push(path);
            }
        }
        Ok(())
    }
}

#[async_trait]
impl ModelStore for FileSystemStore {
    async fn discover(&self) -> RepositoryResult<Vec<StoredDocument>> {
        let mut paths = Vec::new();
        self.collect(&self.root_path, &mut paths).await?;

        let mut documents = Vec::with_capacity(paths.len());
        for path in paths {
            match fs::read_to_string(&path).await {
                Ok(content) => {
                    documents.push(StoredDocument::new(path.display().to_string(), content))
                }
                Err(e) => {
                    tracing::warn!("Skipping unreadable model file {}: {}", path.display(), e)
                }
            }
        }

        tracing::debug!(
            "Discovered {} model documents under {}",
            documents.len(),
            self.root_path.display()
        );
        Ok(documents)
    }

    async fn write(&self, location: &str, content: &str) -> RepositoryResult<()> {
        fs::write(location, content).await?;
        Ok(())
    }

    async fn copy(&self, from: &str, to: &str) -> RepositoryResult<()> {
        fs::copy(from, to).await?;
        Ok(())
    }

    async fn exists(&self, location: &str) -> bool {
        fs::metadata(location).await.is_ok()
    }

    async fn is_writable(&self, location: &str) -> bool {
        match fs::metadata(location).await {
            Ok(metadata) => metadata.is_file() && !metadata.permissions().readonly(),
            Err(_) => false,
        }
    }

    fn describe(&self) -> String {
        format!("file system store at {}", self.root_path.display())
    }
}

//! In-memory model store
//!
//! Holds documents in insertion order. Individual documents can be marked
//! read-only to exercise the in-memory-only persistence path.

use async_trait::async_trait;
use std::collections::HashSet;
use tokio::sync::RwLock;

use crate::error::{RepositoryError, RepositoryResult};
use crate::store::{ModelStore, StoredDocument};

/// Suffix that marks a location as a model document
const MODEL_SUFFIX: &str = ".dmn";

#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: RwLock<Vec<StoredDocument>>,
    read_only: RwLock<HashSet<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a document while building the store
    pub fn with_document(mut self, location: impl Into<String>, content: impl Into<String>) -> Self {
        self.documents
            .get_mut()
            .push(StoredDocument::new(location, content));
        self
    }

    pub async fn set_read_only(&self, location: &str, read_only: bool) {
        let mut set = self.read_only.write().await;
        if read_only {
            set.insert(location.to_string());
        } else {
            set.remove(location);
        }
    }

    /// Current content of a document
    pub async fn document(&self, location: &str) -> Option<String> {
        self.documents
            .read()
            .await
            .iter()
            .find(|d| d.location == location)
            .map(|d| d.content.clone())
    }

    /// Every location held, including backups and sidecars
    pub async fn locations(&self) -> Vec<String> {
        self.documents
            .read()
            .await
            .iter()
            .map(|d| d.location.clone())
            .collect()
    }
}

#[async_trait]
impl ModelStore for MemoryStore {
    async fn discover(&self) -> RepositoryResult<Vec<StoredDocument>> {
        Ok(self
            .documents
            .read()
            .await
            .iter()
            .filter(|d| d.location.ends_with(MODEL_SUFFIX))
            .cloned()
            .collect())
    }

    async fn write(&self, location: &str, content: &str) -> RepositoryResult<()> {
        if self.read_only.read().await.contains(location) {
            return Err(RepositoryError::Other(format!("{} is read-only", location)));
        }

        let mut documents = self.documents.write().await;
        match documents.iter_mut().find(|d| d.location == location) {
            Some(document) => document.content = content.to_string(),
            None => documents.push(StoredDocument::new(location, content)),
        }
        Ok(())
    }

    async fn copy(&self, from: &str, to: &str) -> RepositoryResult<()> {
        let content = self
            .document(from)
            .await
            .ok_or_else(|| RepositoryError::NotFound {
                location: from.to_string(),
            })?;
        self.write(to, &content).await
    }

    async fn exists(&self, location: &str) -> bool {
        self.documents
            .read()
            .await
            .iter()
            .any(|d| d.location == location)
    }

    async fn is_writable(&self, location: &str) -> bool {
        self.exists(location).await && !self.read_only.read().await.contains(location)
    }

    fn describe(&self) -> String {
        "memory store".to_string()
    }
}

//! Model store abstraction
//!
//! A store knows where model documents live and how to read and write
//! them. Locations are opaque strings chosen by the store; derived
//! documents (backups, test-case sidecars) are named by appending to the
//! location of the model they belong to.

use crate::error::RepositoryResult;
use async_trait::async_trait;

/// A model document as found in a store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredDocument {
    pub location: String,
    pub content: String,
}

impl StoredDocument {
    pub fn new(location: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            content: content.into(),
        }
    }
}

/// Storage backend for model documents
///
/// All implementations must be `Send + Sync` for use across async tasks.
#[async_trait]
pub trait ModelStore: Send + Sync {
    /// Every model document in the store, in a stable order
    async fn discover(&self) -> RepositoryResult<Vec<StoredDocument>>;

    /// Create or overwrite a document
    async fn write(&self, location: &str, content: &str) -> RepositoryResult<()>;

    async fn copy(&self, from: &str, to: &str) -> RepositoryResult<()>;

    async fn exists(&self, location: &str) -> bool;

    /// Whether the document at `location` may be overwritten
    async fn is_writable(&self, location: &str) -> bool;

    /// Short description for logs
    fn describe(&self) -> String;
}

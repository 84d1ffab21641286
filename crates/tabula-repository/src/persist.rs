//! Persistence and backup
//!
//! Writes an edited model back to its store. The previous document is
//! copied to `<location>.<epoch-millis>.bak` first (with a `-<n>` suffix if
//! that name is taken). A document that cannot be written leaves the edit
//! in memory only; that is reported, not raised.

use serde::{Deserialize, Serialize};
use tabula_core::ast::Model;
use tabula_parser::ModelWriter;

use crate::error::RepositoryResult;
use crate::store::ModelStore;

/// Outcome of writing a model back
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PersistStatus {
    /// Written to the store
    Persisted {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        backup: Option<String>,
    },

    /// The edit lives in memory only
    InMemoryOnly { reason: String },
}

impl PersistStatus {
    pub fn is_persisted(&self) -> bool {
        matches!(self, PersistStatus::Persisted { .. })
    }
}

#[derive(Debug, Clone)]
pub struct Persister {
    backups: bool,
}

impl Default for Persister {
    fn default() -> Self {
        Self { backups: true }
    }
}

impl Persister {
    pub fn new(backups: bool) -> Self {
        Self { backups }
    }

    /// Write `model` to `location`, backing up the current document first
    pub async fn persist(&self, store: &dyn ModelStore, location: &str, model: &Model) -> PersistStatus {
        if !store.is_writable(location).await {
            tracing::warn!(
                "Model document {} is not writable; edit applied in memory only",
                location
            );
            return PersistStatus::InMemoryOnly {
                reason: format!("{} is not writable", location),
            };
        }

        let content = match ModelWriter::write(model) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!("Failed to serialize model {}: {}", model.identity(), e);
                return PersistStatus::InMemoryOnly {
                    reason: e.to_string(),
                };
            }
        };

        let backup = if self.backups {
            match self.backup(store, location).await {
                Ok(backup) => Some(backup),
                Err(e) => {
                    tracing::warn!("Failed to back up {}: {}", location, e);
                    return PersistStatus::InMemoryOnly {
                        reason: format!("backup failed: {}", e),
                    };
                }
            }
        } else {
            None
        };

        match store.write(location, &content).await {
            Ok(()) => {
                tracing::info!("Updated model document {}", location);
                PersistStatus::Persisted { backup }
            }
            Err(e) => {
                tracing::warn!("Failed to write model document {}: {}", location, e);
                PersistStatus::InMemoryOnly {
                    reason: e.to_string(),
                }
            }
        }
    }

    async fn backup(&self, store: &dyn ModelStore, location: &str) -> RepositoryResult<String> {
        let millis = chrono::Utc::now().timestamp_millis();
        let mut name = backup_name(location, millis, 0);
        let mut attempt = 0;
        while store.exists(&name).await {
            attempt += 1;
            name = backup_name(location, millis, attempt);
        }

        store.copy(location, &name).await?;
        tracing::info!("Created model backup: {}", name);
        Ok(name)
    }

    /// Write test cases submitted with an edit next to the model document.
    ///
    /// Returns the sidecar location. Independent of whether the model
    /// document itself could be written.
    pub async fn write_test_cases(
        &self,
        store: &dyn ModelStore,
        location: &str,
        decision: &str,
        test_cases: &serde_json::Value,
    ) -> RepositoryResult<String> {
        let sidecar = sidecar_name(location, decision);
        let json = serde_json::to_string_pretty(test_cases)?;
        store.write(&sidecar, &json).await?;
        tracing::info!("Wrote test cases sidecar: {}", sidecar);
        Ok(sidecar)
    }
}

/// `<location>.<millis>.bak`, or `<location>.<millis>-<n>.bak` for `n > 0`
pub fn backup_name(location: &str, millis: i64, attempt: u32) -> String {
    if attempt == 0 {
        format!("{}.{}.bak", location, millis)
    } else {
        format!("{}.{}-{}.bak", location, millis, attempt)
    }
}

/// `<location>.<decision>.testcases.json`, with path separators replaced
pub fn sidecar_name(location: &str, decision: &str) -> String {
    let decision: String = decision
        .chars()
        .map(|c| if c == '/' || c == '\\' { '_' } else { c })
        .collect();
    format!("{}.{}.testcases.json", location, decision)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use std::collections::HashSet;

    fn model() -> Model {
        Model::new("loan", "https://example.com/loan")
    }

    #[test]
    fn test_names() {
        assert_eq!(backup_name("m/loan.dmn", 1700000000000, 0), "m/loan.dmn.1700000000000.bak");
        assert_eq!(backup_name("m/loan.dmn", 1700000000000, 2), "m/loan.dmn.1700000000000-2.bak");
        assert_eq!(sidecar_name("loan.dmn", "a/b"), "loan.dmn.a_b.testcases.json");
    }

    #[tokio::test]
    async fn test_persist_with_backup() {
        let store = MemoryStore::new().with_document("loan.dmn", "<old/>");
        let status = Persister::default().persist(&store, "loan.dmn", &model()).await;

        let backup = match status {
            PersistStatus::Persisted { backup: Some(backup) } => backup,
            other => panic!("unexpected status {:?}", other),
        };
        assert_eq!(store.document(&backup).await.as_deref(), Some("<old/>"));
        assert!(store.document("loan.dmn").await.unwrap().contains("name=\"loan\""));
    }

    #[tokio::test]
    async fn test_repeated_backups_never_collide() {
        let store = MemoryStore::new().with_document("loan.dmn", "<old/>");
        let persister = Persister::default();

        let mut backups = HashSet::new();
        for _ in 0..3 {
            if let PersistStatus::Persisted { backup: Some(b) } =
                persister.persist(&store, "loan.dmn", &model()).await
            {
                backups.insert(b);
            }
        }
        assert_eq!(backups.len(), 3);
    }

    #[tokio::test]
    async fn test_read_only_document_degrades() {
        let store = MemoryStore::new().with_document("loan.dmn", "<old/>");
        store.set_read_only("loan.dmn", true).await;

        let status = Persister::default().persist(&store, "loan.dmn", &model()).await;
        assert!(matches!(status, PersistStatus::InMemoryOnly { .. }));
        assert_eq!(store.document("loan.dmn").await.as_deref(), Some("<old/>"));
        assert_eq!(store.locations().await, vec!["loan.dmn"]);

        // Sidecars do not depend on the document being writable
        let sidecar = Persister::default()
            .write_test_cases(&store, "loan.dmn", "approve", &serde_json::json!([{ "score": 1 }]))
            .await
            .unwrap();
        assert_eq!(sidecar, "loan.dmn.approve.testcases.json");
    }
}

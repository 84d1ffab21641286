//! Build and hot-reload manager
//!
//! The active artifact sits behind an atomically swapped pointer. Readers
//! load it without locking and keep their snapshot for as long as they
//! need it; a build replaces the pointer only once the whole model set
//! compiled. Builds themselves are serialized by a single build lock.

use crate::config::EditPolicy;
use crate::error::{Result, SdkError};
use arc_swap::ArcSwap;
use std::sync::Arc;
use tabula_compiler::{BuildErrors, Compiler};
use tabula_core::ast::Model;
use tabula_core::ir::CompiledArtifact;
use tokio::sync::{Mutex, MutexGuard};

/// Proof that the holder owns the build lock
pub struct BuildGuard<'a> {
    _guard: MutexGuard<'a, ()>,
}

pub struct ReloadManager {
    active: ArcSwap<CompiledArtifact>,
    build_lock: Mutex<()>,
    compiler: Compiler,
    policy: EditPolicy,
}

impl ReloadManager {
    /// Start with an empty artifact at version 0
    pub fn new(compiler: Compiler, policy: EditPolicy) -> Self {
        Self {
            active: ArcSwap::from_pointee(CompiledArtifact::empty()),
            build_lock: Mutex::new(()),
            compiler,
            policy,
        }
    }

    /// The active artifact
    pub fn current(&self) -> Arc<CompiledArtifact> {
        self.active.load_full()
    }

    pub fn active_version(&self) -> u64 {
        self.active.load().version()
    }

    pub fn is_building(&self) -> bool {
        self.build_lock.try_lock().is_err()
    }

    /// Take the build lock, waiting or failing according to the edit policy
    pub async fn lock(&self) -> Result<BuildGuard<'_>> {
        let guard = match self.policy {
            EditPolicy::Queue => self.build_lock.lock().await,
            EditPolicy::Reject => self
                .build_lock
                .try_lock()
                .map_err(|_| SdkError::BuildInProgress)?,
        };
        Ok(BuildGuard { _guard: guard })
    }

    /// Compile the full model set without publishing it
    pub fn build(
        &self,
        _guard: &BuildGuard<'_>,
        models: &[Model],
    ) -> std::result::Result<CompiledArtifact, BuildErrors> {
        match self.compiler.compile(models) {
            Ok(artifact) => {
                tracing::debug!("Built artifact for {} models", artifact.models.len());
                Ok(artifact)
            }
            Err(errors) => {
                tracing::error!("Build failed with {} errors", errors.len());
                for message in errors.messages() {
                    tracing::error!("  {}", message);
                }
                Err(errors)
            }
        }
    }

    /// Stamp the next version on `artifact` and make it the active one
    pub fn publish(&self, _guard: &BuildGuard<'_>, artifact: CompiledArtifact) -> Arc<CompiledArtifact> {
        let version = self.active_version() + 1;
        let artifact = Arc::new(artifact.with_version(version, chrono::Utc::now().to_rfc3339()));
        self.active.store(artifact.clone());
        tracing::info!(
            "Published artifact v{} with {} models",
            version,
            artifact.models.len()
        );
        artifact
    }

    /// Build and publish in one step.
    ///
    /// On failure the previous artifact stays active.
    pub async fn rebuild(&self, models: &[Model]) -> Result<Arc<CompiledArtifact>> {
        let guard = self.lock().await?;
        let artifact = self.build(&guard, models)?;
        Ok(self.publish(&guard, artifact))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabula_core::ast::{Decision, InputColumn, OutputColumn, Rule, RuleTable};

    fn model(threshold: &str) -> Model {
        let table = RuleTable::new()
            .add_input(InputColumn::new("score"))
            .add_output(OutputColumn::new("approved"))
            .add_rule(Rule::new([threshold], ["true"]));
        Model::new("loan", "ns").add_decision(Decision::new("approve").with_table(table))
    }

    #[tokio::test]
    async fn test_versions_increase() {
        let manager = ReloadManager::new(Compiler::new(), EditPolicy::Queue);
        assert_eq!(manager.active_version(), 0);
        assert!(manager.current().is_empty());

        manager.rebuild(&[model(">= 700")]).await.unwrap();
        let second = manager.rebuild(&[model(">= 650")]).await.unwrap();

        assert_eq!(second.version(), 2);
        assert_eq!(manager.active_version(), 2);
        assert!(manager.current().metadata.built_at.is_some());
    }

    #[tokio::test]
    async fn test_failed_build_keeps_previous_artifact() {
        let manager = ReloadManager::new(Compiler::new(), EditPolicy::Queue);
        let first = manager.rebuild(&[model(">= 700")]).await.unwrap();

        let broken = model(">= 700").add_decision(
            Decision::new("broken").with_table(
                RuleTable::new()
                    .add_input(InputColumn::new("x"))
                    .add_output(OutputColumn::new("y"))
                    .add_rule(Rule::new(["1", "2"], ["3"])),
            ),
        );
        let result = manager.rebuild(&[broken]).await;

        assert!(matches!(result, Err(SdkError::Build(_))));
        assert!(Arc::ptr_eq(&first, &manager.current()));
    }

    #[tokio::test]
    async fn test_reject_policy() {
        let manager = ReloadManager::new(Compiler::new(), EditPolicy::Reject);
        let guard = manager.lock().await.unwrap();
        assert!(manager.is_building());

        assert!(matches!(manager.lock().await, Err(SdkError::BuildInProgress)));
        drop(guard);
        assert!(manager.lock().await.is_ok());
    }

    #[tokio::test]
    async fn test_readers_keep_their_snapshot() {
        let manager = ReloadManager::new(Compiler::new(), EditPolicy::Queue);
        manager.rebuild(&[model(">= 700")]).await.unwrap();

        let held = manager.current();
        manager.rebuild(&[model(">= 650")]).await.unwrap();

        assert_eq!(held.version(), 1);
        assert_eq!(manager.current().version(), 2);
    }
}

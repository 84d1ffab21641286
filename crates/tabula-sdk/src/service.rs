//! DecisionService - main entry point for evaluation and table editing

use crate::error::Result;
use crate::reload::ReloadManager;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tabula_compiler::CompileError;
use tabula_core::ast::Model;
use tabula_core::ir::CompiledArtifact;
use tabula_core::types::Value;
use tabula_repository::{
    ModelSchema, ModelStore, ModelSummary, PersistStatus, Persister, TableRepository, TableSummary,
    TableView,
};
use tabula_runtime::{EvaluationRequest, EvaluationResult, Evaluator};

/// Overall outcome of a table replacement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplaceStatus {
    /// Built, published and written back
    Ok,
    /// The edited model set did not compile; nothing changed
    BuildFailed,
    /// Built and published, but only held in memory
    PersistDegraded,
}

/// Response of [`DecisionService::replace_table`]
#[derive(Debug, Clone, Serialize)]
pub struct ReplaceTableResponse {
    pub status: ReplaceStatus,
    pub model: String,
    pub decision: String,

    /// Active artifact version once the call returns
    pub version: u64,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<CompileError>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub persistence: Option<PersistStatus>,

    /// Location of the test-case sidecar, when one was written
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_cases: Option<String>,
}

impl ReplaceTableResponse {
    pub fn is_ok(&self) -> bool {
        self.status == ReplaceStatus::Ok
    }
}

/// Decision service
///
/// Evaluation reads the active artifact without locking. Edits and reloads
/// take the build lock, rebuild the full model set and only then swap the
/// new artifact in.
pub struct DecisionService {
    repository: TableRepository,
    store: Arc<dyn ModelStore>,
    persister: Persister,
    reload: ReloadManager,
    evaluator: Evaluator,
}

impl DecisionService {
    pub(crate) fn new(
        repository: TableRepository,
        store: Arc<dyn ModelStore>,
        persister: Persister,
        reload: ReloadManager,
        evaluator: Evaluator,
    ) -> Self {
        Self {
            repository,
            store,
            persister,
            reload,
            evaluator,
        }
    }

    /// Generate a unique request ID
    /// Format: eval_YYYYMMDDHHmmss_xxxxxx
    fn generate_request_id() -> String {
        use chrono::Utc;
        use rand::Rng;

        let datetime_str = Utc::now().format("%Y%m%d%H%M%S").to_string();
        let random: u32 = rand::thread_rng().gen_range(0..0xFFFFFF);

        format!("eval_{}_{:06x}", datetime_str, random)
    }

    /// Evaluate facts against the active artifact.
    ///
    /// `model_hint` picks a model by name or namespace when no default
    /// model is configured.
    pub fn evaluate(
        &self,
        model_hint: Option<&str>,
        facts: HashMap<String, Value>,
    ) -> Result<EvaluationResult> {
        let mut request = EvaluationRequest::new(Self::generate_request_id(), facts);
        if let Some(hint) = model_hint {
            request = request.with_model_hint(hint);
        }
        self.evaluate_request(request)
    }

    /// Evaluate a request carrying its own id
    pub fn evaluate_request(&self, request: EvaluationRequest) -> Result<EvaluationResult> {
        let artifact = self.reload.current();
        Ok(self.evaluator.evaluate(&artifact, request)?)
    }

    pub async fn list_models(&self) -> Vec<ModelSummary> {
        self.repository.list_models().await
    }

    pub async fn get_schema(&self, model: &str) -> Result<ModelSchema> {
        Ok(self.repository.get_schema(model).await?)
    }

    pub async fn list_tables(&self, model: &str) -> Result<Vec<TableSummary>> {
        Ok(self.repository.list_tables(model).await?)
    }

    pub async fn get_table(&self, model: &str, decision: &str) -> Result<TableView> {
        Ok(self.repository.get_table(model, decision).await?)
    }

    /// Replace a decision's table and hot-reload.
    ///
    /// The full model set is rebuilt before anything is written. When the
    /// build fails the edit is rolled back and the response carries the
    /// build errors. Otherwise the model is persisted and the new artifact
    /// is published. Optional test cases go to a sidecar in either case.
    pub async fn replace_table(
        &self,
        model: &str,
        decision: &str,
        table_document: &str,
        test_cases: Option<&serde_json::Value>,
    ) -> Result<ReplaceTableResponse> {
        let guard = self.reload.lock().await?;
        let edit = self
            .repository
            .replace_table(model, decision, table_document)
            .await?;

        // Test cases are kept whatever the build or persist outcome
        let sidecar = match test_cases {
            Some(cases) => self.write_test_cases(&edit.location, &edit.decision, cases).await,
            None => None,
        };

        let models = self.repository.snapshot().await;
        let artifact = match self.reload.build(&guard, &models) {
            Ok(artifact) => artifact,
            Err(errors) => {
                tracing::warn!(
                    "Rolling back table of '{}' in model '{}': {}",
                    edit.decision,
                    edit.model.name,
                    errors
                );
                self.repository
                    .restore_table(&edit.model.name, &edit.decision, edit.previous)
                    .await?;
                return Ok(ReplaceTableResponse {
                    status: ReplaceStatus::BuildFailed,
                    model: edit.model.name,
                    decision: edit.decision,
                    version: self.reload.active_version(),
                    errors: errors.errors,
                    persistence: None,
                    test_cases: sidecar,
                });
            }
        };

        let persistence = self
            .persister
            .persist(self.store.as_ref(), &edit.location, &edit.model)
            .await;

        let published = self.reload.publish(&guard, artifact);

        let status = if persistence.is_persisted() {
            ReplaceStatus::Ok
        } else {
            ReplaceStatus::PersistDegraded
        };

        Ok(ReplaceTableResponse {
            status,
            model: edit.model.name,
            decision: edit.decision,
            version: published.version(),
            errors: Vec::new(),
            persistence: Some(persistence),
            test_cases: sidecar,
        })
    }

    async fn write_test_cases(
        &self,
        location: &str,
        decision: &str,
        cases: &serde_json::Value,
    ) -> Option<String> {
        match self
            .persister
            .write_test_cases(self.store.as_ref(), location, decision, cases)
            .await
        {
            Ok(sidecar) => Some(sidecar),
            Err(e) => {
                tracing::warn!("Failed to write test cases for '{}': {}", decision, e);
                None
            }
        }
    }

    /// Re-read every document from the store and rebuild.
    ///
    /// In-memory edits that were not persisted are discarded. When the
    /// rebuild fails the current models and artifact stay in place.
    pub async fn reload(&self) -> Result<u64> {
        let guard = self.reload.lock().await?;
        let entries = TableRepository::discover(self.store.as_ref()).await?;
        let models: Vec<Model> = entries.iter().map(|entry| entry.model.clone()).collect();

        let artifact = self.reload.build(&guard, &models)?;
        self.repository.install(entries).await;
        let published = self.reload.publish(&guard, artifact);

        tracing::info!("Reloaded {} models from {}", models.len(), self.store.describe());
        Ok(published.version())
    }

    pub fn active_version(&self) -> u64 {
        self.reload.active_version()
    }

    /// Snapshot of the active artifact
    pub fn current_artifact(&self) -> Arc<CompiledArtifact> {
        self.reload.current()
    }

    pub fn reload_manager(&self) -> &ReloadManager {
        &self.reload
    }

    pub fn repository(&self) -> &TableRepository {
        &self.repository
    }

    pub fn store(&self) -> &Arc<dyn ModelStore> {
        &self.store
    }
}

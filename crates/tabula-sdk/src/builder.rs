//! Builder pattern for DecisionService

use crate::config::{EditPolicy, EngineConfig};
use crate::error::Result;
use crate::reload::ReloadManager;
use crate::service::DecisionService;
use std::sync::Arc;
use tabula_compiler::{Compiler, CompilerOptions};
use tabula_repository::{ModelStore, Persister, RepositoryConfig, TableRepository};
use tabula_runtime::{Evaluator, ModelSelector, PredicateEvaluator};

/// Builder for DecisionService
///
/// # Example
///
/// ```rust,ignore
/// use tabula_sdk::{DecisionServiceBuilder, RepositoryConfig};
///
/// // From a directory of model documents
/// let service = DecisionServiceBuilder::new()
///     .with_repository(RepositoryConfig::file_system("models"))
///     .with_default_model("loan")
///     .build()
///     .await?;
///
/// // From an explicit store (for testing)
/// let store = MemoryStore::new().with_document("loan.dmn", xml);
/// let service = DecisionServiceBuilder::new()
///     .with_store(Arc::new(store))
///     .build()
///     .await?;
/// ```
pub struct DecisionServiceBuilder {
    config: EngineConfig,
    store: Option<Arc<dyn ModelStore>>,
    predicate: Option<Arc<dyn PredicateEvaluator>>,
}

impl DecisionServiceBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self {
            config: EngineConfig::new(),
            store: None,
            predicate: None,
        }
    }

    /// Replace the whole configuration
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Set repository configuration.
    ///
    /// Ignored when a store is given with [`Self::with_store`].
    pub fn with_repository(mut self, config: RepositoryConfig) -> Self {
        self.config.repository = config;
        self
    }

    /// Use an already opened store
    pub fn with_store(mut self, store: Arc<dyn ModelStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_default_model(mut self, model: impl Into<String>) -> Self {
        self.config.default_model = Some(model.into());
        self
    }

    pub fn with_edit_policy(mut self, policy: EditPolicy) -> Self {
        self.config.edit_policy = policy;
        self
    }

    pub fn with_compiler_options(mut self, options: CompilerOptions) -> Self {
        self.config.compiler_options = options;
        self
    }

    /// Replace the built-in unary-test evaluator
    pub fn with_predicate_evaluator(mut self, predicate: Arc<dyn PredicateEvaluator>) -> Self {
        self.predicate = Some(predicate);
        self
    }

    /// Build the decision service
    ///
    /// Loads every model from the store and publishes the first artifact.
    /// Fails when that first build fails, since there is no artifact to
    /// fall back to.
    pub async fn build(self) -> Result<DecisionService> {
        let store = match self.store {
            Some(store) => store,
            None => self.config.repository.open_store()?,
        };

        let repository = TableRepository::new();
        let count = repository.load(store.as_ref()).await?;
        tracing::info!("Loaded {} models from {}", count, store.describe());

        let reload = ReloadManager::new(
            Compiler::with_options(self.config.compiler_options.clone()),
            self.config.edit_policy,
        );
        {
            let guard = reload.lock().await?;
            let artifact = reload.build(&guard, &repository.snapshot().await)?;
            reload.publish(&guard, artifact);
        }

        let mut selector = ModelSelector::new();
        if let Some(model) = &self.config.default_model {
            selector = selector.with_default_model(model.clone());
        }
        let mut evaluator = Evaluator::new().with_selector(selector);
        if let Some(predicate) = self.predicate {
            evaluator = evaluator.with_predicate_evaluator(predicate);
        }

        Ok(DecisionService::new(
            repository,
            store,
            Persister::new(self.config.repository.backups),
            reload,
            evaluator,
        ))
    }
}

impl Default for DecisionServiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

//! Configuration types for DecisionService

use serde::{Deserialize, Serialize};
use tabula_compiler::CompilerOptions;
use tabula_repository::RepositoryConfig;

/// What happens to an edit that arrives while another build runs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditPolicy {
    /// Wait for the running build to finish
    #[default]
    Queue,
    /// Fail fast with `BuildInProgress`
    Reject,
}

/// Main engine configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Where model documents live
    #[serde(default)]
    pub repository: RepositoryConfig,

    /// Name or namespace of the model evaluated when present
    #[serde(default)]
    pub default_model: Option<String>,

    #[serde(default)]
    pub edit_policy: EditPolicy,

    #[serde(default)]
    pub compiler_options: CompilerOptions,
}

impl EngineConfig {
    /// Create a new engine configuration
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_repository(mut self, repository: RepositoryConfig) -> Self {
        self.repository = repository;
        self
    }

    pub fn with_default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = Some(model.into());
        self
    }

    pub fn with_edit_policy(mut self, policy: EditPolicy) -> Self {
        self.edit_policy = policy;
        self
    }

    pub fn with_compiler_options(mut self, options: CompilerOptions) -> Self {
        self.compiler_options = options;
        self
    }
}

//! Tabula Decision-Table Engine SDK
//!
//! High-level API over the engine: evaluate facts against the active
//! artifact, inspect and edit rule tables, and hot-reload the compiled
//! artifact after every edit.

pub mod builder;
pub mod config;
pub mod error;
pub mod reload;
pub mod service;

// Re-export main types
pub use builder::DecisionServiceBuilder;
pub use config::{EditPolicy, EngineConfig};
pub use error::{Result, SdkError};
pub use reload::{BuildGuard, ReloadManager};
pub use service::{DecisionService, ReplaceStatus, ReplaceTableResponse};

// Re-export commonly used types from dependencies
pub use tabula_compiler::{BuildErrors, CompileError, CompilerOptions};
pub use tabula_core::ir::CompiledArtifact;
pub use tabula_core::types::{SchemaNode, Value};
pub use tabula_repository::{
    MemoryStore, ModelSchema, ModelStore, ModelSummary, PersistStatus, RepositoryConfig,
    RepositoryError, TableSummary, TableView,
};
pub use tabula_runtime::{DecisionOutcome, EvaluationRequest, EvaluationResult, PredicateEvaluator};

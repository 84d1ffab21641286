//! Compiled artifact

use super::table::CompiledTable;
use crate::ast::ModelId;
use serde::{Deserialize, Serialize};

/// An immutable, evaluable snapshot of every model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledArtifact {
    /// Models in repository order
    pub models: Vec<CompiledModel>,

    pub metadata: ArtifactMetadata,
}

/// Metadata describing a build
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactMetadata {
    /// Monotonic version, assigned when the artifact is published
    pub version: u64,

    /// RFC 3339 timestamp of the build
    pub built_at: Option<String>,

    /// Identities of the models in the artifact
    pub model_ids: Vec<ModelId>,

    /// Version of the compiler that produced the artifact
    pub compiler_version: String,
}

/// A compiled model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledModel {
    pub id: ModelId,

    /// Decisions ordered so that every decision follows the ones it requires
    pub decisions: Vec<CompiledDecision>,
}

/// A compiled decision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledDecision {
    pub id: Option<String>,
    pub name: String,
    pub table: Option<CompiledTable>,
}

impl CompiledArtifact {
    /// Create an unversioned artifact over the given models
    pub fn new(models: Vec<CompiledModel>, compiler_version: impl Into<String>) -> Self {
        let model_ids = models.iter().map(|m| m.id.clone()).collect();
        Self {
            models,
            metadata: ArtifactMetadata {
                version: 0,
                built_at: None,
                model_ids,
                compiler_version: compiler_version.into(),
            },
        }
    }

    /// An artifact with no models, used before the first successful build
    pub fn empty() -> Self {
        Self::new(Vec::new(), "")
    }

    /// Stamp the version and build time
    pub fn with_version(mut self, version: u64, built_at: impl Into<String>) -> Self {
        self.metadata.version = version;
        self.metadata.built_at = Some(built_at.into());
        self
    }

    pub fn version(&self) -> u64 {
        self.metadata.version
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn model_ids(&self) -> &[ModelId] {
        &self.metadata.model_ids
    }

    pub fn find_model(&self, id: &ModelId) -> Option<&CompiledModel> {
        self.models.iter().find(|m| &m.id == id)
    }
}

impl CompiledModel {
    /// Find a decision by name, case-insensitively
    pub fn decision(&self, name: &str) -> Option<&CompiledDecision> {
        self.decisions
            .iter()
            .find(|d| d.name.eq_ignore_ascii_case(name))
    }
}

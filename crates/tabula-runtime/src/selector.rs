//! Model selection
//!
//! Tie-break order: the configured default model, then the first model
//! matching the caller's hint, then the first model in the artifact.

use crate::error::{Result, RuntimeError};
use tabula_core::ir::{CompiledArtifact, CompiledModel};

/// Picks the model an evaluation runs against
#[derive(Debug, Clone, Default)]
pub struct ModelSelector {
    default_model: Option<String>,
}

impl ModelSelector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prefer the model whose name or namespace matches `designation`
    pub fn with_default_model(mut self, designation: impl Into<String>) -> Self {
        self.default_model = Some(designation.into());
        self
    }

    pub fn default_model(&self) -> Option<&str> {
        self.default_model.as_deref()
    }

    pub fn select<'a>(
        &self,
        artifact: &'a CompiledArtifact,
        hint: Option<&str>,
    ) -> Result<&'a CompiledModel> {
        if let Some(designation) = self.default_model.as_deref() {
            if let Some(model) = find(artifact, designation) {
                return Ok(model);
            }
            tracing::debug!("Default model '{}' not in artifact", designation);
        }

        if let Some(hint) = hint.filter(|h| !h.trim().is_empty()) {
            if let Some(model) = find(artifact, hint.trim()) {
                return Ok(model);
            }
        }

        let model = artifact.models.first().ok_or(RuntimeError::NoModelsAvailable)?;
        tracing::warn!(
            "No model matched hint {:?}, falling back to first model {}",
            hint,
            model.id
        );
        Ok(model)
    }
}

fn find<'a>(artifact: &'a CompiledArtifact, designation: &str) -> Option<&'a CompiledModel> {
    artifact
        .models
        .iter()
        .find(|model| model.id.matches_hint(designation))
}

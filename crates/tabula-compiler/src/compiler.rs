//! Main compiler
//!
//! Compiles a full model set into one artifact. Problems are collected
//! across every model and decision rather than stopping at the first one.

use crate::dependency::order_decisions;
use crate::error::{BuildErrors, CompileError, Result};
use crate::table_compiler::TableCompiler;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tabula_core::ast::Model;
use tabula_core::ir::{CompiledArtifact, CompiledDecision, CompiledModel};

/// Compiler options
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompilerOptions {
    /// Accept entries outside the built-in unary-test syntax.
    ///
    /// Only useful with a predicate evaluator that understands them.
    #[serde(default)]
    pub allow_expressions: bool,
}

/// The Tabula compiler
#[derive(Debug, Clone, Default)]
pub struct Compiler {
    options: CompilerOptions,
}

impl Compiler {
    /// Create a new compiler instance with default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new compiler instance with custom options
    pub fn with_options(options: CompilerOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &CompilerOptions {
        &self.options
    }

    /// Compile every model into an unversioned artifact
    pub fn compile(&self, models: &[Model]) -> Result<CompiledArtifact> {
        let mut errors = Vec::new();
        let compiled: Vec<CompiledModel> = models
            .iter()
            .map(|model| self.compile_model(model, &mut errors))
            .collect();

        if !errors.is_empty() {
            return Err(BuildErrors::new(errors));
        }

        Ok(CompiledArtifact::new(compiled, env!("CARGO_PKG_VERSION")))
    }

    fn compile_model(&self, model: &Model, errors: &mut Vec<CompileError>) -> CompiledModel {
        let mut seen = HashSet::new();
        for decision in &model.decisions {
            if !seen.insert(decision.name.to_lowercase()) {
                errors.push(CompileError::DuplicateDecision {
                    model: model.name.clone(),
                    decision: decision.name.clone(),
                });
            }
        }

        let table_compiler = TableCompiler::new(&self.options);
        let decisions = order_decisions(model, errors)
            .into_iter()
            .map(|index| {
                let decision = &model.decisions[index];
                let table = decision.table.as_ref().and_then(|table| {
                    table_compiler.compile(&model.name, &decision.name, table, errors)
                });
                CompiledDecision {
                    id: decision.id.clone(),
                    name: decision.name.clone(),
                    table,
                }
            })
            .collect();

        CompiledModel {
            id: model.identity(),
            decisions,
        }
    }
}

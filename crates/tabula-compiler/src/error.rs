//! Compiler error types
//!
//! Every problem found while building carries a stable code (`E001`...) so
//! callers can tell them apart without matching on message text.

use serde::Serialize;
use thiserror::Error;

/// A single build problem
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "error", rename_all = "snake_case")]
pub enum CompileError {
    /// A rule has the wrong number of input or output entries
    #[error("[E001] {model}/{decision}: rule {rule} has {found} {kind} entries, table has {expected} {kind} columns")]
    EntryCountMismatch {
        model: String,
        decision: String,
        rule: usize,
        kind: EntryKind,
        expected: usize,
        found: usize,
    },

    #[error("[E002] {model}/{decision}: unknown hit policy '{policy}'")]
    UnknownHitPolicy {
        model: String,
        decision: String,
        policy: String,
    },

    /// Unknown aggregation, or an aggregation on a policy other than COLLECT
    #[error("[E003] {model}/{decision}: {message}")]
    InvalidAggregation {
        model: String,
        decision: String,
        message: String,
    },

    /// An entry outside the built-in syntax while expressions are disabled
    #[error("[E004] {model}/{decision}: rule {rule} has unsupported entry '{entry}'")]
    UnsupportedEntry {
        model: String,
        decision: String,
        rule: usize,
        entry: String,
    },

    #[error("[E005] {model}/{decision}: required decision '{reference}' does not exist")]
    UnknownRequiredDecision {
        model: String,
        decision: String,
        reference: String,
    },

    #[error("[E006] {model}: decision dependency cycle: {}", .path.join(" -> "))]
    DecisionCycle { model: String, path: Vec<String> },

    #[error("[E007] {model}: decision '{decision}' is declared more than once")]
    DuplicateDecision { model: String, decision: String },

    #[error("[E008] {model}/{decision}: decision table has no output columns")]
    MissingOutputs { model: String, decision: String },
}

/// Which side of a rule an entry belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Input,
    Output,
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntryKind::Input => f.write_str("input"),
            EntryKind::Output => f.write_str("output"),
        }
    }
}

impl CompileError {
    /// Stable code of the error
    pub fn code(&self) -> &'static str {
        match self {
            CompileError::EntryCountMismatch { .. } => "E001",
            CompileError::UnknownHitPolicy { .. } => "E002",
            CompileError::InvalidAggregation { .. } => "E003",
            CompileError::UnsupportedEntry { .. } => "E004",
            CompileError::UnknownRequiredDecision { .. } => "E005",
            CompileError::DecisionCycle { .. } => "E006",
            CompileError::DuplicateDecision { .. } => "E007",
            CompileError::MissingOutputs { .. } => "E008",
        }
    }
}

/// Every problem found by one build; never empty
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[error("Build failed with {} error(s): {}", .errors.len(), summary(.errors))]
pub struct BuildErrors {
    pub errors: Vec<CompileError>,
}

fn summary(errors: &[CompileError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl BuildErrors {
    pub fn new(errors: Vec<CompileError>) -> Self {
        Self { errors }
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Human-readable messages, one per error
    pub fn messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }
}

/// Result type for compiler operations
pub type Result<T> = std::result::Result<T, BuildErrors>;

//! Tabula Runtime - Evaluation engine for compiled decision tables
//!
//! This crate evaluates a fact map against a compiled artifact: it picks the
//! target model, matches each decision's rules through a pluggable
//! predicate evaluator and applies the table's hit policy.

pub mod context;
pub mod error;
pub mod evaluator;
pub mod hit_policy;
pub mod predicate;
pub mod selector;

// Re-export main types
pub use context::{EvaluationContext, FactScope};
pub use error::{Result, RuntimeError};
pub use evaluator::{DecisionOutcome, DecisionResult, EvaluationRequest, EvaluationResult, Evaluator};
pub use hit_policy::{apply_hit_policy, RuleMatch};
pub use predicate::{DefaultPredicateEvaluator, PredicateEvaluator};
pub use selector::ModelSelector;

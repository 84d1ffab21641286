//! Evaluation context
//!
//! Holds the fact scope for one evaluation. Decision results are added to
//! the scope as they are computed so later decisions can match on them.

use crate::predicate::PredicateEvaluator;
use std::collections::HashMap;
use tabula_core::types::Value;

/// Facts visible to an evaluation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FactScope {
    facts: HashMap<String, Value>,
}

impl FactScope {
    pub fn new(facts: HashMap<String, Value>) -> Self {
        Self { facts }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.facts.get(name)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.facts.insert(name.into(), value);
    }

    /// Look up a dotted path.
    ///
    /// A key equal to the whole dotted text wins; otherwise the first
    /// segment names a fact and the rest walk into nested objects.
    pub fn lookup(&self, path: &[String]) -> Option<&Value> {
        let (first, rest) = path.split_first()?;
        if !rest.is_empty() {
            if let Some(value) = self.facts.get(&path.join(".")) {
                return Some(value);
            }
        }
        self.facts.get(first)?.lookup(rest)
    }

    pub fn len(&self) -> usize {
        self.facts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    pub fn into_inner(self) -> HashMap<String, Value> {
        self.facts
    }
}

/// Per-request evaluation state.
///
/// Dropping the context releases it with the predicate evaluator; a failed
/// release is logged and never reaches the caller.
pub struct EvaluationContext<'a> {
    request_id: String,
    scope: FactScope,
    evaluator: &'a dyn PredicateEvaluator,
}

impl<'a> EvaluationContext<'a> {
    pub fn new(
        request_id: impl Into<String>,
        facts: HashMap<String, Value>,
        evaluator: &'a dyn PredicateEvaluator,
    ) -> Self {
        Self {
            request_id: request_id.into(),
            scope: FactScope::new(facts),
            evaluator,
        }
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    pub fn scope(&self) -> &FactScope {
        &self.scope
    }

    /// Publish a decision result to later decisions
    pub fn store_result(&mut self, decision: &str, value: Value) {
        self.scope.insert(decision, value);
    }

    pub fn evaluator(&self) -> &'a dyn PredicateEvaluator {
        self.evaluator
    }
}

impl Drop for EvaluationContext<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.evaluator.release(&self.request_id) {
            tracing::warn!(
                request_id = %self.request_id,
                "Failed to release evaluation context: {}",
                e
            );
        }
    }
}

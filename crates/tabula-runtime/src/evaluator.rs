//! Evaluator
//!
//! Runs every decision of the selected model against a fact map, in the
//! order the compiler fixed, and reports one outcome per decision.

use crate::context::EvaluationContext;
use crate::error::Result;
use crate::hit_policy::{apply_hit_policy, RuleMatch};
use crate::predicate::{DefaultPredicateEvaluator, PredicateEvaluator};
use crate::selector::ModelSelector;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tabula_core::ast::{HitPolicy, ModelId};
use tabula_core::ir::{CompiledArtifact, CompiledTable};
use tabula_core::types::Value;

/// Input to one evaluation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EvaluationRequest {
    pub request_id: String,

    /// Name or namespace of the preferred model
    #[serde(default)]
    pub model_hint: Option<String>,

    #[serde(default)]
    pub facts: HashMap<String, Value>,
}

impl EvaluationRequest {
    pub fn new(request_id: impl Into<String>, facts: HashMap<String, Value>) -> Self {
        Self {
            request_id: request_id.into(),
            model_hint: None,
            facts,
        }
    }

    pub fn with_model_hint(mut self, hint: impl Into<String>) -> Self {
        self.model_hint = Some(hint.into());
        self
    }
}

/// What a single decision produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DecisionOutcome {
    Value { value: Value },

    /// No table, or no rule matched
    NoResult,

    Failed { message: String },
}

impl DecisionOutcome {
    pub fn value(&self) -> Option<&Value> {
        match self {
            DecisionOutcome::Value { value } => Some(value),
            _ => None,
        }
    }

    pub fn is_no_result(&self) -> bool {
        matches!(self, DecisionOutcome::NoResult)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionResult {
    pub decision: String,

    #[serde(flatten)]
    pub outcome: DecisionOutcome,
}

/// Result of evaluating one model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub request_id: String,
    pub model: ModelId,

    /// Version of the artifact the evaluation ran against
    pub artifact_version: u64,

    /// Per-decision outcomes in evaluation order
    pub decisions: Vec<DecisionResult>,
}

impl EvaluationResult {
    /// Find a decision's outcome by name, case-insensitively
    pub fn get(&self, decision: &str) -> Option<&DecisionOutcome> {
        self.decisions
            .iter()
            .find(|d| d.decision.eq_ignore_ascii_case(decision))
            .map(|d| &d.outcome)
    }

    /// Decision name to value; decisions without a value map to null
    pub fn values(&self) -> BTreeMap<String, Value> {
        self.decisions
            .iter()
            .map(|d| {
                let value = d.outcome.value().cloned().unwrap_or(Value::Null);
                (d.decision.clone(), value)
            })
            .collect()
    }

    pub fn failures(&self) -> impl Iterator<Item = &DecisionResult> {
        self.decisions
            .iter()
            .filter(|d| matches!(d.outcome, DecisionOutcome::Failed { .. }))
    }
}

/// Evaluates requests against a compiled artifact.
///
/// Holds no artifact itself: callers pass the snapshot they loaded, so any
/// number of evaluations can share one without locking.
#[derive(Clone)]
pub struct Evaluator {
    predicate: Arc<dyn PredicateEvaluator>,
    selector: ModelSelector,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self {
            predicate: Arc::new(DefaultPredicateEvaluator::new()),
            selector: ModelSelector::new(),
        }
    }
}

impl Evaluator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_predicate_evaluator(mut self, predicate: Arc<dyn PredicateEvaluator>) -> Self {
        self.predicate = predicate;
        self
    }

    pub fn with_selector(mut self, selector: ModelSelector) -> Self {
        self.selector = selector;
        self
    }

    pub fn selector(&self) -> &ModelSelector {
        &self.selector
    }

    pub fn evaluate(
        &self,
        artifact: &CompiledArtifact,
        request: EvaluationRequest,
    ) -> Result<EvaluationResult> {
        let span = tracing::info_span!("evaluate", request_id = %request.request_id);
        let _enter = span.enter();

        let mut ctx = EvaluationContext::new(request.request_id, request.facts, self.predicate.as_ref());
        let model = self.selector.select(artifact, request.model_hint.as_deref())?;

        tracing::debug!(
            "Evaluating model {} (artifact v{}, {} decisions)",
            model.id,
            artifact.version(),
            model.decisions.len()
        );

        let mut decisions = Vec::with_capacity(model.decisions.len());
        for decision in &model.decisions {
            let outcome = match &decision.table {
                None => DecisionOutcome::NoResult,
                Some(table) => match evaluate_table(table, &ctx) {
                    Ok(Some(value)) => {
                        ctx.store_result(&decision.name, value.clone());
                        DecisionOutcome::Value { value }
                    }
                    Ok(None) => DecisionOutcome::NoResult,
                    Err(e) => {
                        tracing::warn!("Decision '{}' failed: {}", decision.name, e);
                        DecisionOutcome::Failed {
                            message: e.to_string(),
                        }
                    }
                },
            };
            decisions.push(DecisionResult {
                decision: decision.name.clone(),
                outcome,
            });
        }

        Ok(EvaluationResult {
            request_id: ctx.request_id().to_string(),
            model: model.id.clone(),
            artifact_version: artifact.version(),
            decisions,
        })
    }
}

/// Match every rule, then let the hit policy pick the value
fn evaluate_table(table: &CompiledTable, ctx: &EvaluationContext<'_>) -> Result<Option<Value>> {
    let evaluator = ctx.evaluator();
    let scope = ctx.scope();

    let inputs: Vec<Value> = table
        .inputs
        .iter()
        .map(|input| scope.lookup(&input.path).cloned().unwrap_or(Value::Null))
        .collect();

    let mut matches = Vec::new();
    for rule in &table.rules {
        let mut matched = true;
        for (test, input) in rule.tests.iter().zip(&inputs) {
            if !evaluator.matches(test, input, scope)? {
                matched = false;
                break;
            }
        }
        if !matched {
            continue;
        }

        let outputs = rule
            .outputs
            .iter()
            .map(|entry| evaluator.output(entry, scope))
            .collect::<Result<Vec<_>>>()?;
        matches.push(RuleMatch {
            rule: rule.index,
            outputs,
        });

        if table.hit_policy == HitPolicy::First {
            break;
        }
    }

    tracing::debug!("{} of {} rules matched", matches.len(), table.rule_count());
    apply_hit_policy(table, matches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RuntimeError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tabula_core::ir::{CompiledDecision, CompiledInput, CompiledModel, CompiledOutput, CompiledRule};
    use tabula_core::unary::{OutputEntry, UnaryTest, UnaryTestParser};

    fn rule(index: usize, input: &str, output: &str) -> CompiledRule {
        let parser = UnaryTestParser::new();
        CompiledRule {
            index,
            tests: vec![parser.parse_input(input)],
            outputs: vec![parser.parse_output(output)],
        }
    }

    fn approve_artifact() -> CompiledArtifact {
        let table = CompiledTable {
            hit_policy: HitPolicy::First,
            aggregation: None,
            inputs: vec![CompiledInput::new("score", "score")],
            outputs: vec![CompiledOutput {
                name: "approved".to_string(),
                priorities: Vec::new(),
            }],
            rules: vec![rule(0, ">= 700", "true"), rule(1, "-", "false")],
        };
        let model = CompiledModel {
            id: ModelId::new("loan", "https://example.com/loan"),
            decisions: vec![
                CompiledDecision {
                    id: Some("d_approve".to_string()),
                    name: "approve".to_string(),
                    table: Some(table),
                },
                CompiledDecision {
                    id: None,
                    name: "manual".to_string(),
                    table: None,
                },
            ],
        };
        CompiledArtifact::new(vec![model], "test").with_version(1, "2024-01-01T00:00:00Z")
    }

    fn request(score: f64) -> EvaluationRequest {
        let mut facts = HashMap::new();
        facts.insert("score".to_string(), Value::from(score));
        EvaluationRequest::new("eval_test", facts).with_model_hint("loan")
    }

    #[test]
    fn test_evaluate_first_policy() {
        let evaluator = Evaluator::new();
        let artifact = approve_artifact();

        let result = evaluator.evaluate(&artifact, request(750.0)).unwrap();
        assert_eq!(result.get("approve").and_then(DecisionOutcome::value), Some(&Value::Bool(true)));
        assert_eq!(result.artifact_version, 1);

        let result = evaluator.evaluate(&artifact, request(600.0)).unwrap();
        assert_eq!(result.get("APPROVE").and_then(DecisionOutcome::value), Some(&Value::Bool(false)));
    }

    #[test]
    fn test_decision_without_table_has_no_result() {
        let result = Evaluator::new().evaluate(&approve_artifact(), request(750.0)).unwrap();
        assert!(result.get("manual").unwrap().is_no_result());
        assert_eq!(result.values().get("manual"), Some(&Value::Null));
    }

    #[test]
    fn test_outcome_serialization() {
        let result = Evaluator::new().evaluate(&approve_artifact(), request(750.0)).unwrap();
        let json = serde_json::to_value(&result.decisions).unwrap();
        assert_eq!(
            json,
            serde_json::json!([
                { "decision": "approve", "status": "value", "value": true },
                { "decision": "manual", "status": "no_result" }
            ])
        );
    }

    struct CountingEvaluator {
        released: AtomicUsize,
        fail_release: bool,
    }

    impl PredicateEvaluator for CountingEvaluator {
        fn matches(&self, test: &UnaryTest, input: &Value, scope: &crate::FactScope) -> Result<bool> {
            DefaultPredicateEvaluator.matches(test, input, scope)
        }

        fn output(&self, entry: &OutputEntry, scope: &crate::FactScope) -> Result<Value> {
            DefaultPredicateEvaluator.output(entry, scope)
        }

        fn release(&self, _request_id: &str) -> Result<()> {
            self.released.fetch_add(1, Ordering::SeqCst);
            if self.fail_release {
                return Err(RuntimeError::ReleaseFailed("pool closed".to_string()));
            }
            Ok(())
        }
    }

    #[test]
    fn test_context_released_on_every_path() {
        let counting = Arc::new(CountingEvaluator {
            released: AtomicUsize::new(0),
            fail_release: true,
        });
        let evaluator = Evaluator::new().with_predicate_evaluator(counting.clone());

        // Release failures are logged, the result still comes back
        assert!(evaluator.evaluate(&approve_artifact(), request(750.0)).is_ok());

        let err = evaluator
            .evaluate(&CompiledArtifact::empty(), request(750.0))
            .unwrap_err();
        assert_eq!(err, RuntimeError::NoModelsAvailable);

        assert_eq!(counting.released.load(Ordering::SeqCst), 2);
    }
}

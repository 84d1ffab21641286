//! Predicate evaluation
//!
//! Matching a cell against a fact is delegated to a [`PredicateEvaluator`]
//! so hosts can plug in a richer expression language. The default
//! evaluator covers the simple unary-test syntax.

use crate::context::FactScope;
use crate::error::{Result, RuntimeError};
use std::cmp::Ordering;
use tabula_core::types::Value;
use tabula_core::unary::{Comparator, Operand, OutputEntry, UnaryTest};

/// Evaluates rule entries against facts
pub trait PredicateEvaluator: Send + Sync {
    /// Whether `input` satisfies `test`
    fn matches(&self, test: &UnaryTest, input: &Value, scope: &FactScope) -> Result<bool>;

    /// Compute the value of an output entry
    fn output(&self, entry: &OutputEntry, scope: &FactScope) -> Result<Value>;

    /// Called once when an evaluation context is dropped
    fn release(&self, _request_id: &str) -> Result<()> {
        Ok(())
    }
}

/// Evaluator for the built-in unary-test syntax
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultPredicateEvaluator;

impl DefaultPredicateEvaluator {
    pub fn new() -> Self {
        Self
    }

    fn operand(&self, operand: &Operand, scope: &FactScope) -> Value {
        match operand {
            Operand::Literal(value) => value.clone(),
            Operand::FactRef(path) => scope.lookup(path).cloned().unwrap_or(Value::Null),
        }
    }
}

impl PredicateEvaluator for DefaultPredicateEvaluator {
    fn matches(&self, test: &UnaryTest, input: &Value, scope: &FactScope) -> Result<bool> {
        match test {
            UnaryTest::Any => Ok(true),
            UnaryTest::Compare { op, operand } => {
                compare(input, *op, &self.operand(operand, scope))
            }
            UnaryTest::Range {
                low,
                high,
                low_inclusive,
                high_inclusive,
            } => {
                let low = self.operand(low, scope);
                let high = self.operand(high, scope);
                let low_op = if *low_inclusive { Comparator::Ge } else { Comparator::Gt };
                let high_op = if *high_inclusive { Comparator::Le } else { Comparator::Lt };
                Ok(compare(input, low_op, &low)? && compare(input, high_op, &high)?)
            }
            UnaryTest::Disjunction(tests) => {
                for test in tests {
                    if self.matches(test, input, scope)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            UnaryTest::Negation(tests) => {
                for test in tests {
                    if self.matches(test, input, scope)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            UnaryTest::Expression(text) => Err(RuntimeError::UnsupportedEntry(text.clone())),
        }
    }

    fn output(&self, entry: &OutputEntry, scope: &FactScope) -> Result<Value> {
        match entry {
            OutputEntry::Value(value) => Ok(value.clone()),
            OutputEntry::FactRef(path) => Ok(scope.lookup(path).cloned().unwrap_or(Value::Null)),
            OutputEntry::Expression(text) => Err(RuntimeError::UnsupportedEntry(text.clone())),
        }
    }
}

/// Compare a fact against an operand.
///
/// Equality is structural, so `null` only equals `null`. Ordering against
/// `null` never matches, which lets rules skip missing facts.
fn compare(left: &Value, op: Comparator, right: &Value) -> Result<bool> {
    match op {
        Comparator::Eq => return Ok(left == right),
        Comparator::Ne => return Ok(left != right),
        _ => {}
    }

    if left.is_null() || right.is_null() {
        tracing::debug!(
            "Null comparison: {} {} {}, returning false",
            left,
            op,
            right
        );
        return Ok(false);
    }

    let ordering = left.compare(right)?;
    Ok(match op {
        Comparator::Lt => ordering == Ordering::Less,
        Comparator::Le => ordering != Ordering::Greater,
        Comparator::Gt => ordering == Ordering::Greater,
        Comparator::Ge => ordering != Ordering::Less,
        Comparator::Eq => ordering == Ordering::Equal,
        Comparator::Ne => ordering != Ordering::Equal,
    })
}

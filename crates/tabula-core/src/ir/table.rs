//! Compiled rule tables

use crate::ast::{Aggregation, HitPolicy};
use crate::types::Value;
use crate::unary::{OutputEntry, UnaryTest};
use serde::{Deserialize, Serialize};

/// A rule table ready for evaluation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledTable {
    pub hit_policy: HitPolicy,
    pub aggregation: Option<Aggregation>,
    pub inputs: Vec<CompiledInput>,
    pub outputs: Vec<CompiledOutput>,
    pub rules: Vec<CompiledRule>,
}

/// An input column: its label and the fact path it reads
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledInput {
    pub label: String,
    pub path: Vec<String>,
}

/// An output column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledOutput {
    pub name: String,

    /// Declared output values, highest priority first
    #[serde(default)]
    pub priorities: Vec<Value>,
}

/// A rule with its entries parsed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledRule {
    /// Position of the rule in its table
    pub index: usize,
    pub tests: Vec<UnaryTest>,
    pub outputs: Vec<OutputEntry>,
}

impl CompiledTable {
    pub fn is_single_output(&self) -> bool {
        self.outputs.len() == 1
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }
}

impl CompiledInput {
    pub fn new(label: impl Into<String>, expression: &str) -> Self {
        Self {
            label: label.into(),
            path: expression
                .split('.')
                .map(|segment| segment.trim().to_string())
                .collect(),
        }
    }
}

impl CompiledOutput {
    /// Rank of `value` in the priority list; lower is higher priority.
    ///
    /// Values missing from the list rank after every listed value.
    pub fn priority_of(&self, value: &Value) -> usize {
        self.priorities
            .iter()
            .position(|candidate| candidate == value)
            .unwrap_or(self.priorities.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_of() {
        let output = CompiledOutput {
            name: "risk".to_string(),
            priorities: vec![Value::from("HIGH"), Value::from("MEDIUM"), Value::from("LOW")],
        };
        assert_eq!(output.priority_of(&Value::from("HIGH")), 0);
        assert_eq!(output.priority_of(&Value::from("LOW")), 2);
        assert_eq!(output.priority_of(&Value::from("UNKNOWN")), 3);
    }

    #[test]
    fn test_input_path_split() {
        let input = CompiledInput::new("Score", "applicant.score");
        assert_eq!(input.path, vec!["applicant", "score"]);
    }
}

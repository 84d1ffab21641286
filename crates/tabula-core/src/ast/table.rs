//! Rule table AST definitions

use super::opaque::OpaqueElement;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Hit policy of a rule table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum HitPolicy {
    /// First matching rule in table order wins
    #[default]
    First,
    /// At most one rule may match
    Unique,
    /// Several rules may match if they agree on the output
    Any,
    /// Highest-priority output wins, priority given by the output values list
    Priority,
    /// Every match, in table order, optionally aggregated
    Collect,
    /// Every match, in table order
    RuleOrder,
    /// Every match, ordered by output priority
    OutputOrder,
    /// A policy tag this engine does not know
    Other(String),
}

impl HitPolicy {
    /// Parse a hit policy tag; an empty tag means the default policy
    pub fn parse(tag: &str) -> Self {
        match tag.trim().to_ascii_uppercase().as_str() {
            "" | "FIRST" => HitPolicy::First,
            "UNIQUE" => HitPolicy::Unique,
            "ANY" => HitPolicy::Any,
            "PRIORITY" => HitPolicy::Priority,
            "COLLECT" => HitPolicy::Collect,
            "RULE ORDER" => HitPolicy::RuleOrder,
            "OUTPUT ORDER" => HitPolicy::OutputOrder,
            _ => HitPolicy::Other(tag.trim().to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            HitPolicy::First => "FIRST",
            HitPolicy::Unique => "UNIQUE",
            HitPolicy::Any => "ANY",
            HitPolicy::Priority => "PRIORITY",
            HitPolicy::Collect => "COLLECT",
            HitPolicy::RuleOrder => "RULE ORDER",
            HitPolicy::OutputOrder => "OUTPUT ORDER",
            HitPolicy::Other(tag) => tag,
        }
    }

    /// Whether the policy returns every match rather than a single one
    pub fn is_multi_hit(&self) -> bool {
        matches!(
            self,
            HitPolicy::Collect | HitPolicy::RuleOrder | HitPolicy::OutputOrder
        )
    }
}

impl fmt::Display for HitPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Aggregation applied by the COLLECT hit policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Aggregation {
    Sum,
    Count,
    Min,
    Max,
    Other(String),
}

impl Aggregation {
    pub fn parse(tag: &str) -> Self {
        match tag.trim().to_ascii_uppercase().as_str() {
            "SUM" => Aggregation::Sum,
            "COUNT" => Aggregation::Count,
            "MIN" => Aggregation::Min,
            "MAX" => Aggregation::Max,
            _ => Aggregation::Other(tag.trim().to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Aggregation::Sum => "SUM",
            Aggregation::Count => "COUNT",
            Aggregation::Min => "MIN",
            Aggregation::Max => "MAX",
            Aggregation::Other(tag) => tag,
        }
    }
}

/// A rule table (`decisionTable`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleTable {
    pub id: Option<String>,
    pub hit_policy: HitPolicy,
    pub aggregation: Option<Aggregation>,
    pub output_label: Option<String>,
    pub inputs: Vec<InputColumn>,
    pub outputs: Vec<OutputColumn>,
    pub rules: Vec<Rule>,

    /// Uninterpreted children (description, annotation columns, ...)
    pub extra: Vec<OpaqueElement>,
}

/// The expression an input column reads its fact from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputExpression {
    pub id: Option<String>,
    pub type_ref: Option<String>,
    pub text: String,
}

/// An input column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputColumn {
    pub id: Option<String>,

    /// Explicit `label` attribute
    pub label: Option<String>,

    /// Explicit `name` attribute
    pub name: Option<String>,

    pub expression: Option<InputExpression>,

    /// Name of a nested variable, if the column declares one
    pub variable: Option<String>,

    pub extra: Vec<OpaqueElement>,
}

/// An output column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputColumn {
    pub id: Option<String>,
    pub name: String,
    pub label: Option<String>,
    pub type_ref: Option<String>,

    /// Text of the `outputValues` list, used for priority ordering
    pub output_values: Option<String>,

    pub extra: Vec<OpaqueElement>,
}

/// A rule row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub id: Option<String>,
    pub description: Option<String>,

    /// One entry per input column; empty or `-` matches anything
    pub input_entries: Vec<String>,

    /// One entry per output column
    pub output_entries: Vec<String>,

    /// Uninterpreted children (annotation entries, ...)
    pub extra: Vec<OpaqueElement>,
}

impl RuleTable {
    pub fn new() -> Self {
        Self {
            id: None,
            hit_policy: HitPolicy::default(),
            aggregation: None,
            output_label: None,
            inputs: Vec::new(),
            outputs: Vec::new(),
            rules: Vec::new(),
            extra: Vec::new(),
        }
    }

    pub fn with_hit_policy(mut self, hit_policy: HitPolicy) -> Self {
        self.hit_policy = hit_policy;
        self
    }

    pub fn with_aggregation(mut self, aggregation: Aggregation) -> Self {
        self.aggregation = Some(aggregation);
        self
    }

    pub fn add_input(mut self, column: InputColumn) -> Self {
        self.inputs.push(column);
        self
    }

    pub fn add_output(mut self, column: OutputColumn) -> Self {
        self.outputs.push(column);
        self
    }

    pub fn add_rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Resolved labels of the input columns, in order
    pub fn input_labels(&self) -> Vec<String> {
        self.inputs.iter().map(InputColumn::display_label).collect()
    }

    /// Output column names, in order
    pub fn output_names(&self) -> Vec<String> {
        self.outputs.iter().map(|o| o.name.clone()).collect()
    }

    /// Pad every rule's input entries with wildcards up to the column count.
    ///
    /// Returns the number of rules that were padded. Excess entries and
    /// output entry mismatches are left in place for the compiler to report.
    pub fn pad_input_entries(&mut self) -> usize {
        let columns = self.inputs.len();
        let mut padded = 0;
        for rule in &mut self.rules {
            if rule.input_entries.len() < columns {
                rule.input_entries.resize(columns, "-".to_string());
                padded += 1;
            }
        }
        padded
    }
}

impl Default for RuleTable {
    fn default() -> Self {
        Self::new()
    }
}

impl InputColumn {
    /// Column reading the given expression, labelled by it
    pub fn new(expression: impl Into<String>) -> Self {
        Self {
            id: None,
            label: None,
            name: None,
            expression: Some(InputExpression {
                id: None,
                type_ref: None,
                text: expression.into(),
            }),
            variable: None,
            extra: Vec::new(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_type_ref(mut self, type_ref: impl Into<String>) -> Self {
        if let Some(expr) = self.expression.as_mut() {
            expr.type_ref = Some(type_ref.into());
        }
        self
    }

    /// Column label: explicit label, then expression text, then the
    /// column's name, then its variable's name; first non-empty wins.
    pub fn display_label(&self) -> String {
        let candidates = [
            self.label.as_deref(),
            self.expression.as_ref().map(|e| e.text.as_str()),
            self.name.as_deref(),
            self.variable.as_deref(),
        ];
        candidates
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|s| !s.is_empty())
            .unwrap_or("")
            .to_string()
    }

    /// Text the column reads its fact from, falling back to the label
    pub fn expression_text(&self) -> String {
        match self.expression.as_ref().map(|e| e.text.trim()) {
            Some(text) if !text.is_empty() => text.to_string(),
            _ => self.display_label(),
        }
    }
}

impl OutputColumn {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            label: None,
            type_ref: None,
            output_values: None,
            extra: Vec::new(),
        }
    }

    pub fn with_type_ref(mut self, type_ref: impl Into<String>) -> Self {
        self.type_ref = Some(type_ref.into());
        self
    }

    pub fn with_output_values(mut self, values: impl Into<String>) -> Self {
        self.output_values = Some(values.into());
        self
    }
}

impl Rule {
    pub fn new<I, O>(inputs: I, outputs: O) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
        O: IntoIterator,
        O::Item: Into<String>,
    {
        Self {
            id: None,
            description: None,
            input_entries: inputs.into_iter().map(Into::into).collect(),
            output_entries: outputs.into_iter().map(Into::into).collect(),
            extra: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

//! Data models returned by the table repository

use serde::{Deserialize, Serialize};
use tabula_core::ast::{Model, RuleTable};
use tabula_core::types::SchemaNode;

/// A model as listed to callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSummary {
    pub name: String,
    pub namespace: String,
    pub inputs: Vec<InputSummary>,
}

/// Declared input with its raw type reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputSummary {
    pub name: String,
    #[serde(rename = "type")]
    pub type_ref: String,
}

/// A model's inputs with their types expanded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSchema {
    pub name: String,
    pub namespace: String,
    pub inputs: Vec<SchemaInput>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaInput {
    pub name: String,
    #[serde(rename = "type")]
    pub type_ref: String,
    pub schema: SchemaNode,
}

/// A decision and whether it carries a rule table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableSummary {
    pub decision_name: String,
    pub has_table: bool,
}

/// A decision's table in serialized and parsed form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableView {
    pub decision_name: String,

    /// `decisionTable` fragment; `None` when the decision has no table
    pub serialized_table: Option<String>,

    pub parsed: ParsedTable,
}

/// Column labels and rule entries of a table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedTable {
    pub inputs: Vec<String>,
    pub outputs: Vec<String>,
    pub rules: Vec<ParsedRule>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedRule {
    pub inputs: Vec<String>,
    pub outputs: Vec<String>,
}

impl From<&Model> for ModelSummary {
    fn from(model: &Model) -> Self {
        Self {
            name: model.name.clone(),
            namespace: model.namespace.clone(),
            inputs: model
                .inputs
                .iter()
                .map(|input| InputSummary {
                    name: input.name.clone(),
                    type_ref: input.type_ref().to_string(),
                })
                .collect(),
        }
    }
}

impl From<&RuleTable> for ParsedTable {
    fn from(table: &RuleTable) -> Self {
        Self {
            inputs: table.input_labels(),
            outputs: table.output_names(),
            rules: table
                .rules
                .iter()
                .map(|rule| ParsedRule {
                    inputs: rule.input_entries.clone(),
                    outputs: rule.output_entries.clone(),
                })
                .collect(),
        }
    }
}

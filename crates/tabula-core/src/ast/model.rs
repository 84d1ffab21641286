//! Model AST definitions

use super::item::TypeDefinition;
use super::opaque::OpaqueElement;
use super::table::RuleTable;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Model identity: unique by `(name, namespace)`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ModelId {
    pub name: String,
    pub namespace: String,
}

impl ModelId {
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
        }
    }

    /// Case-insensitive match on either the name or the namespace
    pub fn matches_hint(&self, hint: &str) -> bool {
        self.name.eq_ignore_ascii_case(hint) || self.namespace.eq_ignore_ascii_case(hint)
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.name, self.namespace)
    }
}

/// A decision model document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Model {
    /// Optional `id` attribute of the document root
    pub id: Option<String>,

    /// Model name
    pub name: String,

    /// Model namespace
    pub namespace: String,

    /// Namespace prefix used for the document's own elements (e.g. `dmn`)
    pub prefix: Option<String>,

    /// Remaining root attributes (namespace declarations etc.) in document order
    pub attributes: Vec<(String, String)>,

    /// Structured type definitions
    pub type_definitions: Vec<TypeDefinition>,

    /// Declared inputs
    pub inputs: Vec<InputDeclaration>,

    /// Decisions
    pub decisions: Vec<Decision>,

    /// Document order of the root's children
    pub layout: Vec<ModelSlot>,
}

/// Position of a root child in the document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ModelSlot {
    /// Index into `type_definitions`
    TypeDefinition(usize),
    /// Index into `inputs`
    Input(usize),
    /// Index into `decisions`
    Decision(usize),
    /// Element the model does not interpret
    Opaque(OpaqueElement),
}

/// A named, typed variable (`<variable name=".." typeRef=".."/>`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    pub id: Option<String>,
    pub name: String,
    pub type_ref: Option<String>,
}

/// An input declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputDeclaration {
    pub id: Option<String>,
    pub name: String,
    pub variable: Option<Variable>,
    pub extra: Vec<OpaqueElement>,
}

impl InputDeclaration {
    pub fn new(name: impl Into<String>, type_ref: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: None,
            variable: Some(Variable {
                id: None,
                name: name.clone(),
                type_ref: Some(type_ref.into()),
            }),
            name,
            extra: Vec::new(),
        }
    }

    /// Declared type reference, empty when absent
    pub fn type_ref(&self) -> &str {
        self.variable
            .as_ref()
            .and_then(|v| v.type_ref.as_deref())
            .unwrap_or("")
    }
}

/// A decision, optionally backed by a rule table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub id: Option<String>,
    pub name: String,

    /// Children other than the rule table (variable, requirements, ...)
    pub extra: Vec<OpaqueElement>,

    /// Rule table, if the decision carries tabular logic
    pub table: Option<RuleTable>,
}

impl Decision {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            extra: Vec::new(),
            table: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_table(mut self, table: RuleTable) -> Self {
        self.table = Some(table);
        self
    }

    /// Record a dependency on another decision by its id
    pub fn with_required_decision(mut self, decision_id: &str) -> Self {
        let mut required = OpaqueElement::new("requiredDecision");
        required
            .attributes
            .push(("href".to_string(), format!("#{}", decision_id)));
        let mut requirement = OpaqueElement::new("informationRequirement");
        requirement
            .children
            .push(super::opaque::OpaqueNode::Element(required));
        self.extra.push(requirement);
        self
    }

    /// Ids of decisions this decision requires, from its information requirements
    pub fn required_decision_refs(&self) -> Vec<String> {
        self.extra
            .iter()
            .filter(|e| e.local_name() == "informationRequirement")
            .filter_map(|e| e.child("requiredDecision"))
            .filter_map(|r| r.attribute("href"))
            .map(|href| href.trim_start_matches('#').to_string())
            .collect()
    }

    pub fn has_table(&self) -> bool {
        self.table.is_some()
    }
}

impl Model {
    /// Create an empty model
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            namespace: namespace.into(),
            prefix: None,
            attributes: Vec::new(),
            type_definitions: Vec::new(),
            inputs: Vec::new(),
            decisions: Vec::new(),
            layout: Vec::new(),
        }
    }

    pub fn identity(&self) -> ModelId {
        ModelId::new(self.name.clone(), self.namespace.clone())
    }

    /// Add a type definition, keeping the document layout in step
    pub fn add_type_definition(mut self, def: TypeDefinition) -> Self {
        self.layout
            .push(ModelSlot::TypeDefinition(self.type_definitions.len()));
        self.type_definitions.push(def);
        self
    }

    /// Add an input declaration, keeping the document layout in step
    pub fn add_input(mut self, input: InputDeclaration) -> Self {
        self.layout.push(ModelSlot::Input(self.inputs.len()));
        self.inputs.push(input);
        self
    }

    /// Add a decision, keeping the document layout in step
    pub fn add_decision(mut self, decision: Decision) -> Self {
        self.layout.push(ModelSlot::Decision(self.decisions.len()));
        self.decisions.push(decision);
        self
    }

    /// Type definitions keyed by name
    pub fn type_map(&self) -> BTreeMap<&str, &TypeDefinition> {
        self.type_definitions
            .iter()
            .map(|def| (def.name.as_str(), def))
            .collect()
    }

    /// Find a decision by name, case-insensitively
    pub fn find_decision(&self, name: &str) -> Option<&Decision> {
        self.decisions
            .iter()
            .find(|d| d.name.eq_ignore_ascii_case(name))
    }

    /// Find a decision by name for mutation, case-insensitively
    pub fn find_decision_mut(&mut self, name: &str) -> Option<&mut Decision> {
        self.decisions
            .iter_mut()
            .find(|d| d.name.eq_ignore_ascii_case(name))
    }
}

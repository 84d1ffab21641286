//! Schema resolution for declared types
//!
//! A type reference is either a primitive tag (`string`, `number`, ...) or
//! the name of a structured type definition. Resolution expands structured
//! types depth-first into a concrete schema tree.
//!
//! Structured types may refer to each other, so the definitions form a
//! directed graph. The resolver carries the set of type names on the active
//! expansion path and fails with [`CoreError::SchemaCycle`] when a name is
//! re-entered. Types reached along different branches (diamonds) are
//! expanded once per branch and are not cycles.

use crate::ast::{FieldDefinition, TypeDefinition};
use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Type used when a reference is empty
pub const DEFAULT_PRIMITIVE: &str = "string";

/// A resolved schema node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaNode {
    /// Primitive tag, or the structured type's name for records
    #[serde(rename = "type")]
    pub type_ref: String,

    /// Record fields; absent for primitives
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<SchemaField>>,
}

/// A field of a record schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaField {
    pub name: String,

    #[serde(rename = "isCollection")]
    pub is_collection: bool,

    #[serde(rename = "type")]
    pub type_ref: String,

    /// Expanded schema when the field's type is itself structured
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Box<SchemaNode>>,
}

impl SchemaNode {
    pub fn primitive(type_ref: impl Into<String>) -> Self {
        Self {
            type_ref: type_ref.into(),
            fields: None,
        }
    }

    pub fn record(type_ref: impl Into<String>, fields: Vec<SchemaField>) -> Self {
        Self {
            type_ref: type_ref.into(),
            fields: Some(fields),
        }
    }

    pub fn is_record(&self) -> bool {
        self.fields.is_some()
    }

    /// Get a field by name
    pub fn get_field(&self, name: &str) -> Option<&SchemaField> {
        self.fields.as_ref()?.iter().find(|f| f.name == name)
    }
}

/// Expands type references against a set of type definitions
#[derive(Debug)]
pub struct SchemaResolver<'a> {
    definitions: HashMap<&'a str, &'a TypeDefinition>,
}

impl<'a> SchemaResolver<'a> {
    /// Create a resolver over a model's type definitions
    pub fn new(definitions: &'a [TypeDefinition]) -> Self {
        Self {
            definitions: definitions.iter().map(|d| (d.name.as_str(), d)).collect(),
        }
    }

    /// Resolve a type reference into a schema tree
    pub fn resolve(&self, type_ref: &str) -> Result<SchemaNode> {
        let mut path = Vec::new();
        self.expand(type_ref, &mut path)
    }

    fn expand(&self, type_ref: &str, path: &mut Vec<String>) -> Result<SchemaNode> {
        let type_ref = type_ref.trim();
        if type_ref.is_empty() {
            return Ok(SchemaNode::primitive(DEFAULT_PRIMITIVE));
        }

        let Some(definition) = self.definitions.get(type_ref) else {
            return Ok(SchemaNode::primitive(type_ref));
        };

        if let Some(start) = path.iter().position(|name| name == type_ref) {
            let mut cycle = path[start..].to_vec();
            cycle.push(type_ref.to_string());
            log::debug!("schema cycle while resolving '{}': {:?}", type_ref, cycle);
            return Err(CoreError::SchemaCycle { path: cycle });
        }

        path.push(type_ref.to_string());
        let node = self.expand_definition(definition, path);
        path.pop();
        node
    }

    fn expand_definition(
        &self,
        definition: &TypeDefinition,
        path: &mut Vec<String>,
    ) -> Result<SchemaNode> {
        // A definition without fields aliasing another type resolves to that type
        if definition.fields.is_empty() {
            if let Some(alias) = definition.type_ref.as_deref() {
                return self.expand(alias, path);
            }
        }

        let fields = definition
            .fields
            .iter()
            .map(|field| self.expand_field(field, path))
            .collect::<Result<Vec<_>>>()?;
        Ok(SchemaNode::record(definition.name.clone(), fields))
    }

    fn expand_field(&self, field: &FieldDefinition, path: &mut Vec<String>) -> Result<SchemaField> {
        let declared = field.type_ref.trim();

        // Inline anonymous record
        if !field.components.is_empty() {
            let nested = field
                .components
                .iter()
                .map(|component| self.expand_field(component, path))
                .collect::<Result<Vec<_>>>()?;
            let type_ref = if declared.is_empty() {
                field.name.clone()
            } else {
                declared.to_string()
            };
            return Ok(SchemaField {
                name: field.name.clone(),
                is_collection: field.is_collection,
                type_ref: type_ref.clone(),
                schema: Some(Box::new(SchemaNode::record(type_ref, nested))),
            });
        }

        if self.definitions.contains_key(declared) {
            let schema = self.expand(declared, path)?;
            return Ok(SchemaField {
                name: field.name.clone(),
                is_collection: field.is_collection,
                type_ref: declared.to_string(),
                schema: Some(Box::new(schema)),
            });
        }

        Ok(SchemaField {
            name: field.name.clone(),
            is_collection: field.is_collection,
            type_ref: if declared.is_empty() {
                DEFAULT_PRIMITIVE.to_string()
            } else {
                declared.to_string()
            },
            schema: None,
        })
    }
}

/// Resolve `type_ref` against `definitions`
pub fn resolve(type_ref: &str, definitions: &[TypeDefinition]) -> Result<SchemaNode> {
    SchemaResolver::new(definitions).resolve(type_ref)
}

//! Structured type definitions

use super::opaque::OpaqueElement;
use serde::{Deserialize, Serialize};

/// A named record type (`itemDefinition`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDefinition {
    pub id: Option<String>,

    /// Type name, referenced by `typeRef`s elsewhere in the model
    pub name: String,

    /// Aliased type, when the definition is a simple type rather than a record
    pub type_ref: Option<String>,

    pub is_collection: bool,

    /// Record fields in declaration order
    pub fields: Vec<FieldDefinition>,

    /// Uninterpreted children (allowed values, ...)
    pub extra: Vec<OpaqueElement>,
}

/// A record field (`itemComponent`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub id: Option<String>,
    pub name: String,

    /// Primitive tag or the name of another type definition
    pub type_ref: String,

    pub is_collection: bool,

    /// Inline anonymous record fields
    pub components: Vec<FieldDefinition>,

    pub extra: Vec<OpaqueElement>,
}

impl TypeDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            type_ref: None,
            is_collection: false,
            fields: Vec::new(),
            extra: Vec::new(),
        }
    }

    pub fn with_field(mut self, field: FieldDefinition) -> Self {
        self.fields.push(field);
        self
    }
}

impl FieldDefinition {
    pub fn new(name: impl Into<String>, type_ref: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            type_ref: type_ref.into(),
            is_collection: false,
            components: Vec::new(),
            extra: Vec::new(),
        }
    }

    pub fn collection(mut self) -> Self {
        self.is_collection = true;
        self
    }
}

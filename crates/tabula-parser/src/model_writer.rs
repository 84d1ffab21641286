//! Model writer
//!
//! Serializes a Model back into a `definitions` document, following the
//! model's recorded layout so uninterpreted content keeps its position.

use crate::error::Result;
use crate::table_writer::DecisionTableWriter;
use crate::xml_parser::XmlParser;
use crate::DMN_NAMESPACE;
use tabula_core::ast::{
    Decision, FieldDefinition, InputDeclaration, Model, ModelSlot, OpaqueElement, OpaqueNode,
    TypeDefinition,
};

/// Model writer
pub struct ModelWriter;

impl ModelWriter {
    /// Write a full model document, including the XML declaration
    pub fn write(model: &Model) -> Result<String> {
        XmlParser::write(&Self::to_element(model), true)
    }

    /// Build the `definitions` element
    pub fn to_element(model: &Model) -> OpaqueElement {
        let prefix = model.prefix.as_deref();
        let mut root = OpaqueElement::new(XmlParser::qualify(prefix, "definitions"));
        root.attributes = Self::root_attributes(model);

        let mut written_types = vec![false; model.type_definitions.len()];
        let mut written_inputs = vec![false; model.inputs.len()];
        let mut written_decisions = vec![false; model.decisions.len()];

        for slot in &model.layout {
            let element = match slot {
                ModelSlot::TypeDefinition(i) => model.type_definitions.get(*i).map(|def| {
                    written_types[*i] = true;
                    Self::type_element(def, prefix)
                }),
                ModelSlot::Input(i) => model.inputs.get(*i).map(|input| {
                    written_inputs[*i] = true;
                    Self::input_element(input, prefix)
                }),
                ModelSlot::Decision(i) => model.decisions.get(*i).map(|decision| {
                    written_decisions[*i] = true;
                    Self::decision_element(decision, prefix)
                }),
                ModelSlot::Opaque(element) => Some(element.clone()),
            };
            if let Some(element) = element {
                root.children.push(OpaqueNode::Element(element));
            }
        }

        // Entries added without a layout slot go after everything else
        let unplaced = model
            .type_definitions
            .iter()
            .zip(&written_types)
            .filter(|(_, written)| !**written)
            .map(|(def, _)| Self::type_element(def, prefix))
            .chain(
                model
                    .inputs
                    .iter()
                    .zip(&written_inputs)
                    .filter(|(_, written)| !**written)
                    .map(|(input, _)| Self::input_element(input, prefix)),
            )
            .chain(
                model
                    .decisions
                    .iter()
                    .zip(&written_decisions)
                    .filter(|(_, written)| !**written)
                    .map(|(decision, _)| Self::decision_element(decision, prefix)),
            )
            .collect::<Vec<_>>();
        root.children
            .extend(unplaced.into_iter().map(OpaqueNode::Element));

        root
    }

    fn root_attributes(model: &Model) -> Vec<(String, String)> {
        let (mut attributes, rest): (Vec<_>, Vec<_>) = model
            .attributes
            .iter()
            .cloned()
            .partition(|(key, _)| key == "xmlns" || key.starts_with("xmlns:"));

        let own_declaration = match model.prefix.as_deref() {
            Some(p) if !p.is_empty() => format!("xmlns:{}", p),
            _ => "xmlns".to_string(),
        };
        if !attributes.iter().any(|(key, _)| *key == own_declaration) {
            attributes.insert(0, (own_declaration, DMN_NAMESPACE.to_string()));
        }

        if let Some(id) = &model.id {
            attributes.push(("id".to_string(), id.clone()));
        }
        attributes.push(("name".to_string(), model.name.clone()));
        attributes.push(("namespace".to_string(), model.namespace.clone()));
        attributes.extend(rest);
        attributes
    }

    fn type_element(def: &TypeDefinition, prefix: Option<&str>) -> OpaqueElement {
        let mut element = OpaqueElement::new(XmlParser::qualify(prefix, "itemDefinition"));
        if let Some(id) = &def.id {
            element.attributes.push(("id".to_string(), id.clone()));
        }
        element.attributes.push(("name".to_string(), def.name.clone()));
        if def.is_collection {
            element
                .attributes
                .push(("isCollection".to_string(), "true".to_string()));
        }

        if let Some(type_ref) = &def.type_ref {
            element
                .children
                .push(OpaqueNode::Element(Self::type_ref_element(type_ref, prefix)));
        }
        for extra in &def.extra {
            element.children.push(OpaqueNode::Element(extra.clone()));
        }
        for field in &def.fields {
            element
                .children
                .push(OpaqueNode::Element(Self::field_element(field, prefix)));
        }

        element
    }

    fn field_element(field: &FieldDefinition, prefix: Option<&str>) -> OpaqueElement {
        let mut element = OpaqueElement::new(XmlParser::qualify(prefix, "itemComponent"));
        if let Some(id) = &field.id {
            element.attributes.push(("id".to_string(), id.clone()));
        }
        element.attributes.push(("name".to_string(), field.name.clone()));
        if field.is_collection {
            element
                .attributes
                .push(("isCollection".to_string(), "true".to_string()));
        }

        if !field.type_ref.is_empty() {
            element
                .children
                .push(OpaqueNode::Element(Self::type_ref_element(&field.type_ref, prefix)));
        }
        for extra in &field.extra {
            element.children.push(OpaqueNode::Element(extra.clone()));
        }
        for component in &field.components {
            element
                .children
                .push(OpaqueNode::Element(Self::field_element(component, prefix)));
        }

        element
    }

    fn type_ref_element(type_ref: &str, prefix: Option<&str>) -> OpaqueElement {
        let mut element = OpaqueElement::new(XmlParser::qualify(prefix, "typeRef"));
        element.children.push(OpaqueNode::Text(type_ref.to_string()));
        element
    }

    fn input_element(input: &InputDeclaration, prefix: Option<&str>) -> OpaqueElement {
        let mut element = OpaqueElement::new(XmlParser::qualify(prefix, "inputData"));
        if let Some(id) = &input.id {
            element.attributes.push(("id".to_string(), id.clone()));
        }
        element.attributes.push(("name".to_string(), input.name.clone()));

        for extra in &input.extra {
            element.children.push(OpaqueNode::Element(extra.clone()));
        }
        if let Some(variable) = &input.variable {
            let mut var = OpaqueElement::new(XmlParser::qualify(prefix, "variable"));
            if let Some(id) = &variable.id {
                var.attributes.push(("id".to_string(), id.clone()));
            }
            var.attributes.push(("name".to_string(), variable.name.clone()));
            if let Some(type_ref) = &variable.type_ref {
                var.attributes.push(("typeRef".to_string(), type_ref.clone()));
            }
            element.children.push(OpaqueNode::Element(var));
        }

        element
    }

    fn decision_element(decision: &Decision, prefix: Option<&str>) -> OpaqueElement {
        let mut element = OpaqueElement::new(XmlParser::qualify(prefix, "decision"));
        if let Some(id) = &decision.id {
            element.attributes.push(("id".to_string(), id.clone()));
        }
        element
            .attributes
            .push(("name".to_string(), decision.name.clone()));

        for extra in &decision.extra {
            element.children.push(OpaqueNode::Element(extra.clone()));
        }
        if let Some(table) = &decision.table {
            element.children.push(OpaqueNode::Element(DecisionTableWriter::to_element(
                table, prefix,
            )));
        }

        element
    }
}

//! Model parser
//!
//! Parses DMN `definitions` documents into Model AST nodes. Root children
//! the model does not interpret are kept as opaque elements in their
//! original position.

use crate::error::{ParseError, Result};
use crate::table_parser::DecisionTableParser;
use crate::xml_parser::XmlParser;
use tabula_core::ast::{
    Decision, FieldDefinition, InputDeclaration, Model, ModelSlot, OpaqueElement, TypeDefinition,
    Variable,
};

/// Model parser
pub struct ModelParser;

impl ModelParser {
    /// Parse a model document
    pub fn parse(xml: &str) -> Result<Model> {
        let root = XmlParser::parse(xml)?;
        Self::parse_element(&root)
    }

    /// Parse a `definitions` element
    pub fn parse_element(root: &OpaqueElement) -> Result<Model> {
        if root.local_name() != "definitions" {
            return Err(ParseError::UnexpectedRoot {
                expected: "definitions".to_string(),
                found: root.local_name().to_string(),
            });
        }

        let name = root.attribute("name").unwrap_or("").trim().to_string();
        let namespace = root.attribute("namespace").unwrap_or("").trim().to_string();

        let mut model = Model::new(name, namespace);
        model.id = XmlParser::get_optional_attribute(root, "id");
        model.prefix = XmlParser::prefix_of(&root.name).map(str::to_string);
        model.attributes = root
            .attributes
            .iter()
            .filter(|(key, _)| !matches!(key.as_str(), "id" | "name" | "namespace"))
            .cloned()
            .collect();

        for child in root.elements() {
            match child.local_name() {
                "itemDefinition" => {
                    let def = Self::parse_type_definition(child)?;
                    model = model.add_type_definition(def);
                }
                "inputData" => {
                    let input = Self::parse_input(child)?;
                    model = model.add_input(input);
                }
                "decision" => {
                    let decision = Self::parse_decision(child)?;
                    model = model.add_decision(decision);
                }
                _ => model.layout.push(ModelSlot::Opaque(child.clone())),
            }
        }

        log::debug!(
            "parsed model '{}': {} types, {} inputs, {} decisions",
            model.identity(),
            model.type_definitions.len(),
            model.inputs.len(),
            model.decisions.len()
        );

        Ok(model)
    }

    fn parse_type_definition(element: &OpaqueElement) -> Result<TypeDefinition> {
        let mut def = TypeDefinition::new(XmlParser::get_attribute(element, "name")?);
        def.id = XmlParser::get_optional_attribute(element, "id");
        def.is_collection = XmlParser::get_bool_attribute(element, "isCollection")?;
        def.type_ref = XmlParser::get_optional_attribute(element, "typeRef");

        for child in element.elements() {
            match child.local_name() {
                "typeRef" => {
                    let text = child.text_content().trim().to_string();
                    def.type_ref = (!text.is_empty()).then_some(text);
                }
                "itemComponent" => def.fields.push(Self::parse_field(child)?),
                _ => def.extra.push(child.clone()),
            }
        }

        Ok(def)
    }

    fn parse_field(element: &OpaqueElement) -> Result<FieldDefinition> {
        let mut field = FieldDefinition::new(
            XmlParser::get_attribute(element, "name")?,
            element.attribute("typeRef").unwrap_or("").trim(),
        );
        field.id = XmlParser::get_optional_attribute(element, "id");
        field.is_collection = XmlParser::get_bool_attribute(element, "isCollection")?;

        for child in element.elements() {
            match child.local_name() {
                "typeRef" => field.type_ref = child.text_content().trim().to_string(),
                "itemComponent" => field.components.push(Self::parse_field(child)?),
                _ => field.extra.push(child.clone()),
            }
        }

        Ok(field)
    }

    fn parse_input(element: &OpaqueElement) -> Result<InputDeclaration> {
        let name = XmlParser::get_attribute(element, "name")?;
        let mut variable = None;
        let mut extra = Vec::new();

        for child in element.elements() {
            match child.local_name() {
                "variable" => variable = Some(Self::parse_variable(child, &name)),
                _ => extra.push(child.clone()),
            }
        }

        Ok(InputDeclaration {
            id: XmlParser::get_optional_attribute(element, "id"),
            name,
            variable,
            extra,
        })
    }

    fn parse_variable(element: &OpaqueElement, owner: &str) -> Variable {
        Variable {
            id: XmlParser::get_optional_attribute(element, "id"),
            name: XmlParser::get_optional_attribute(element, "name")
                .unwrap_or_else(|| owner.to_string()),
            type_ref: XmlParser::get_optional_attribute(element, "typeRef"),
        }
    }

    fn parse_decision(element: &OpaqueElement) -> Result<Decision> {
        let mut decision = Decision::new(XmlParser::get_attribute(element, "name")?);
        decision.id = XmlParser::get_optional_attribute(element, "id");

        for child in element.elements() {
            match child.local_name() {
                "decisionTable" if decision.table.is_none() => {
                    decision.table = Some(DecisionTableParser::parse_element(child)?);
                }
                _ => decision.extra.push(child.clone()),
            }
        }

        Ok(decision)
    }
}

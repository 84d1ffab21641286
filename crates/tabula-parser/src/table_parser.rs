//! Decision table parser
//!
//! Parses `decisionTable` elements into RuleTable AST nodes.

use crate::error::{ParseError, Result};
use crate::xml_parser::XmlParser;
use tabula_core::ast::{
    Aggregation, HitPolicy, InputColumn, InputExpression, OpaqueElement, OutputColumn, Rule,
    RuleTable,
};

/// Decision table parser
pub struct DecisionTableParser;

impl DecisionTableParser {
    /// Parse a standalone table document.
    ///
    /// The root is either a `decisionTable`, or a `decision` wrapping one.
    pub fn parse(xml: &str) -> Result<RuleTable> {
        let root = XmlParser::parse(xml)?;
        match root.local_name() {
            "decisionTable" => Self::parse_element(&root),
            "decision" => {
                let table = root
                    .child("decisionTable")
                    .ok_or_else(|| ParseError::MissingElement {
                        element: "decisionTable".to_string(),
                    })?;
                Self::parse_element(table)
            }
            other => Err(ParseError::UnexpectedRoot {
                expected: "decisionTable".to_string(),
                found: other.to_string(),
            }),
        }
    }

    /// Parse a `decisionTable` element
    pub fn parse_element(element: &OpaqueElement) -> Result<RuleTable> {
        let mut table = RuleTable::new();
        table.id = XmlParser::get_optional_attribute(element, "id");
        table.hit_policy = HitPolicy::parse(element.attribute("hitPolicy").unwrap_or(""));
        table.aggregation =
            XmlParser::get_optional_attribute(element, "aggregation").map(|a| Aggregation::parse(&a));
        table.output_label = XmlParser::get_optional_attribute(element, "outputLabel");

        for child in element.elements() {
            match child.local_name() {
                "input" => table.inputs.push(Self::parse_input(child)),
                "output" => table.outputs.push(Self::parse_output(child)),
                "rule" => table.rules.push(Self::parse_rule(child)),
                _ => table.extra.push(child.clone()),
            }
        }

        log::debug!(
            "parsed decision table: {} inputs, {} outputs, {} rules",
            table.inputs.len(),
            table.outputs.len(),
            table.rules.len()
        );

        Ok(table)
    }

    fn parse_input(element: &OpaqueElement) -> InputColumn {
        let mut expression = None;
        let mut variable = None;
        let mut extra = Vec::new();

        for child in element.elements() {
            match child.local_name() {
                "inputExpression" => {
                    // The `text` child wins; otherwise the element's own text
                    let text = XmlParser::get_text_child(child)
                        .filter(|t| !t.is_empty())
                        .unwrap_or_else(|| child.text_content().trim().to_string());
                    expression = Some(InputExpression {
                        id: XmlParser::get_optional_attribute(child, "id"),
                        type_ref: XmlParser::get_optional_attribute(child, "typeRef"),
                        text,
                    });
                }
                "variable" => variable = XmlParser::get_optional_attribute(child, "name"),
                _ => extra.push(child.clone()),
            }
        }

        InputColumn {
            id: XmlParser::get_optional_attribute(element, "id"),
            label: element.attribute("label").map(str::to_string),
            name: element.attribute("name").map(str::to_string),
            expression,
            variable,
            extra,
        }
    }

    fn parse_output(element: &OpaqueElement) -> OutputColumn {
        let label = XmlParser::get_optional_attribute(element, "label");
        let name = XmlParser::get_optional_attribute(element, "name")
            .or_else(|| label.clone())
            .unwrap_or_default();

        let mut output_values = None;
        let mut extra = Vec::new();
        for child in element.elements() {
            match child.local_name() {
                "outputValues" => output_values = XmlParser::get_text_child(child),
                _ => extra.push(child.clone()),
            }
        }

        OutputColumn {
            id: XmlParser::get_optional_attribute(element, "id"),
            name,
            label,
            type_ref: XmlParser::get_optional_attribute(element, "typeRef"),
            output_values,
            extra,
        }
    }

    fn parse_rule(element: &OpaqueElement) -> Rule {
        let mut rule = Rule::new(Vec::<String>::new(), Vec::<String>::new());
        rule.id = XmlParser::get_optional_attribute(element, "id");

        for child in element.elements() {
            match child.local_name() {
                "inputEntry" => rule.input_entries.push(Self::entry_text(child)),
                "outputEntry" => rule.output_entries.push(Self::entry_text(child)),
                "description" => {
                    let text = child.text_content().trim().to_string();
                    rule.description = (!text.is_empty()).then_some(text);
                }
                _ => rule.extra.push(child.clone()),
            }
        }

        rule
    }

    fn entry_text(element: &OpaqueElement) -> String {
        XmlParser::get_text_child(element)
            .unwrap_or_else(|| element.text_content().trim().to_string())
    }
}

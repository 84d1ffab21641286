//! Decision table writer
//!
//! Serializes RuleTable AST nodes back into `decisionTable` elements.

use crate::error::Result;
use crate::xml_parser::XmlParser;
use crate::DMN_NAMESPACE;
use std::collections::BTreeSet;
use tabula_core::ast::{
    HitPolicy, InputColumn, OpaqueElement, OpaqueNode, OutputColumn, Rule, RuleTable,
};

/// Decision table writer
pub struct DecisionTableWriter;

impl DecisionTableWriter {
    /// Write a table as a standalone fragment in the default DMN namespace
    pub fn write(table: &RuleTable) -> Result<String> {
        Self::write_with_declarations(table, &[])
    }

    /// Write a standalone fragment, carrying over the `xmlns:<prefix>`
    /// declarations from `declarations` for every prefix the table's
    /// preserved elements still use.
    pub fn write_with_declarations(
        table: &RuleTable,
        declarations: &[(String, String)],
    ) -> Result<String> {
        let mut element = Self::to_element(table, None);

        let mut used = BTreeSet::new();
        collect_prefixes(&element, &mut used);

        let mut attributes = vec![("xmlns".to_string(), DMN_NAMESPACE.to_string())];
        for prefix in used {
            let key = format!("xmlns:{}", prefix);
            if let Some((_, uri)) = declarations.iter().find(|(k, _)| *k == key) {
                attributes.push((key, uri.clone()));
            }
        }
        attributes.append(&mut element.attributes);
        element.attributes = attributes;

        XmlParser::write(&element, false)
    }

    /// Build the `decisionTable` element, qualifying names with `prefix`
    pub fn to_element(table: &RuleTable, prefix: Option<&str>) -> OpaqueElement {
        let mut element = OpaqueElement::new(XmlParser::qualify(prefix, "decisionTable"));

        push_optional(&mut element, "id", table.id.as_deref());
        // FIRST is the default and is left implicit
        if table.hit_policy != HitPolicy::First {
            element
                .attributes
                .push(("hitPolicy".to_string(), table.hit_policy.as_str().to_string()));
        }
        push_optional(
            &mut element,
            "aggregation",
            table.aggregation.as_ref().map(|a| a.as_str()),
        );
        push_optional(&mut element, "outputLabel", table.output_label.as_deref());

        let (annotations, leading): (Vec<_>, Vec<_>) = table
            .extra
            .iter()
            .partition(|e| e.local_name() == "annotation");

        for extra in leading {
            element.children.push(OpaqueNode::Element(extra.clone()));
        }
        for input in &table.inputs {
            element
                .children
                .push(OpaqueNode::Element(Self::input_element(input, prefix)));
        }
        for output in &table.outputs {
            element
                .children
                .push(OpaqueNode::Element(Self::output_element(output, prefix)));
        }
        for annotation in annotations {
            element.children.push(OpaqueNode::Element(annotation.clone()));
        }
        for rule in &table.rules {
            element
                .children
                .push(OpaqueNode::Element(Self::rule_element(rule, prefix)));
        }

        element
    }

    fn input_element(input: &InputColumn, prefix: Option<&str>) -> OpaqueElement {
        let mut element = OpaqueElement::new(XmlParser::qualify(prefix, "input"));
        push_optional(&mut element, "id", input.id.as_deref());
        push_optional(&mut element, "label", input.label.as_deref());
        push_optional(&mut element, "name", input.name.as_deref());

        if let Some(expression) = &input.expression {
            let mut expr = XmlParser::text_element(prefix, "inputExpression", &expression.text);
            let mut attributes = Vec::new();
            if let Some(id) = &expression.id {
                attributes.push(("id".to_string(), id.clone()));
            }
            if let Some(type_ref) = &expression.type_ref {
                attributes.push(("typeRef".to_string(), type_ref.clone()));
            }
            expr.attributes = attributes;
            element.children.push(OpaqueNode::Element(expr));
        }
        if let Some(variable) = &input.variable {
            let mut var = OpaqueElement::new(XmlParser::qualify(prefix, "variable"));
            var.attributes.push(("name".to_string(), variable.clone()));
            element.children.push(OpaqueNode::Element(var));
        }
        for extra in &input.extra {
            element.children.push(OpaqueNode::Element(extra.clone()));
        }

        element
    }

    fn output_element(output: &OutputColumn, prefix: Option<&str>) -> OpaqueElement {
        let mut element = OpaqueElement::new(XmlParser::qualify(prefix, "output"));
        push_optional(&mut element, "id", output.id.as_deref());
        push_optional(&mut element, "label", output.label.as_deref());
        if !output.name.is_empty() {
            element
                .attributes
                .push(("name".to_string(), output.name.clone()));
        }
        push_optional(&mut element, "typeRef", output.type_ref.as_deref());

        if let Some(values) = &output.output_values {
            element.children.push(OpaqueNode::Element(XmlParser::text_element(
                prefix,
                "outputValues",
                values,
            )));
        }
        for extra in &output.extra {
            element.children.push(OpaqueNode::Element(extra.clone()));
        }

        element
    }

    fn rule_element(rule: &Rule, prefix: Option<&str>) -> OpaqueElement {
        let mut element = OpaqueElement::new(XmlParser::qualify(prefix, "rule"));
        push_optional(&mut element, "id", rule.id.as_deref());

        if let Some(description) = &rule.description {
            let mut desc = OpaqueElement::new(XmlParser::qualify(prefix, "description"));
            desc.children.push(OpaqueNode::Text(description.clone()));
            element.children.push(OpaqueNode::Element(desc));
        }
        for entry in &rule.input_entries {
            element.children.push(OpaqueNode::Element(XmlParser::text_element(
                prefix,
                "inputEntry",
                entry,
            )));
        }
        for entry in &rule.output_entries {
            element.children.push(OpaqueNode::Element(XmlParser::text_element(
                prefix,
                "outputEntry",
                entry,
            )));
        }
        for extra in &rule.extra {
            element.children.push(OpaqueNode::Element(extra.clone()));
        }

        element
    }
}

/// Prefixes used by element and attribute names below `element`
fn collect_prefixes<'a>(element: &'a OpaqueElement, used: &mut BTreeSet<&'a str>) {
    let names = std::iter::once(element.name.as_str())
        .chain(element.attributes.iter().map(|(k, _)| k.as_str()));
    for name in names {
        if let Some(prefix) = XmlParser::prefix_of(name) {
            if prefix != "xmlns" && prefix != "xml" {
                used.insert(prefix);
            }
        }
    }
    for child in element.elements() {
        collect_prefixes(child, used);
    }
}

fn push_optional(element: &mut OpaqueElement, key: &str, value: Option<&str>) {
    if let Some(value) = value {
        element.attributes.push((key.to_string(), value.to_string()));
    }
}

//! XML Parser
//!
//! Provides utilities for reading an XML document into a generic element
//! tree and writing such a tree back out. The model parsers interpret the
//! tree; anything they leave alone stays in it as an opaque element.

use crate::error::{ParseError, Result};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use tabula_core::ast::{OpaqueElement, OpaqueNode};

/// XML parser utilities
pub struct XmlParser;

impl XmlParser {
    /// Parse an XML string into its root element
    pub fn parse(xml: &str) -> Result<OpaqueElement> {
        if xml.trim().is_empty() {
            return Err(ParseError::EmptyDocument);
        }

        let mut reader = Reader::from_str(xml);
        let mut stack: Vec<OpaqueElement> = Vec::new();
        let mut root: Option<OpaqueElement> = None;

        loop {
            match reader.read_event().map_err(ParseError::xml)? {
                Event::Start(start) => {
                    if stack.is_empty() && root.is_some() {
                        return Err(ParseError::Xml("multiple root elements".to_string()));
                    }
                    stack.push(Self::element_from_start(&start)?);
                }
                Event::Empty(start) => {
                    let element = Self::element_from_start(&start)?;
                    Self::attach(&mut stack, &mut root, element)?;
                }
                Event::End(_) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| ParseError::Xml("unbalanced closing tag".to_string()))?;
                    Self::attach(&mut stack, &mut root, element)?;
                }
                Event::Text(text) => {
                    if let Some(parent) = stack.last_mut() {
                        let text = text.unescape().map_err(ParseError::xml)?;
                        if !text.trim().is_empty() {
                            parent.children.push(OpaqueNode::Text(text.into_owned()));
                        }
                    }
                }
                Event::CData(data) => {
                    if let Some(parent) = stack.last_mut() {
                        let text = String::from_utf8_lossy(&data).into_owned();
                        parent.children.push(OpaqueNode::Text(text));
                    }
                }
                Event::Eof => break,
                // Declarations, comments, processing instructions and doctypes
                _ => {}
            }
        }

        if let Some(open) = stack.last() {
            return Err(ParseError::Xml(format!(
                "unexpected end of document inside <{}>",
                open.name
            )));
        }

        root.ok_or(ParseError::EmptyDocument)
    }

    fn element_from_start(start: &BytesStart<'_>) -> Result<OpaqueElement> {
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let mut element = OpaqueElement::new(name);

        for attr in start.attributes() {
            let attr = attr.map_err(ParseError::xml)?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr.unescape_value().map_err(ParseError::xml)?.into_owned();
            element.attributes.push((key, value));
        }

        Ok(element)
    }

    fn attach(
        stack: &mut [OpaqueElement],
        root: &mut Option<OpaqueElement>,
        element: OpaqueElement,
    ) -> Result<()> {
        match stack.last_mut() {
            Some(parent) => parent.children.push(OpaqueNode::Element(element)),
            None if root.is_none() => *root = Some(element),
            None => return Err(ParseError::Xml("multiple root elements".to_string())),
        }
        Ok(())
    }

    /// Write an element tree as indented XML
    pub fn write(root: &OpaqueElement, declaration: bool) -> Result<String> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

        if declaration {
            writer
                .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
                .map_err(ParseError::xml)?;
        }
        Self::write_element(&mut writer, root)?;

        String::from_utf8(writer.into_inner()).map_err(ParseError::xml)
    }

    fn write_element(writer: &mut Writer<Vec<u8>>, element: &OpaqueElement) -> Result<()> {
        let mut start = BytesStart::new(element.name.as_str());
        for (key, value) in &element.attributes {
            start.push_attribute((key.as_str(), value.as_str()));
        }

        if element.children.is_empty() {
            return writer.write_event(Event::Empty(start)).map_err(ParseError::xml);
        }

        writer.write_event(Event::Start(start)).map_err(ParseError::xml)?;
        for child in &element.children {
            match child {
                OpaqueNode::Element(e) => Self::write_element(writer, e)?,
                OpaqueNode::Text(text) => writer
                    .write_event(Event::Text(BytesText::new(text)))
                    .map_err(ParseError::xml)?,
            }
        }
        writer
            .write_event(Event::End(BytesEnd::new(element.name.as_str())))
            .map_err(ParseError::xml)
    }

    /// Get a required attribute
    pub fn get_attribute(element: &OpaqueElement, key: &str) -> Result<String> {
        element
            .attribute(key)
            .map(str::to_string)
            .ok_or_else(|| ParseError::MissingAttribute {
                element: element.local_name().to_string(),
                attribute: key.to_string(),
            })
    }

    /// Get an optional attribute, treating blank values as absent
    pub fn get_optional_attribute(element: &OpaqueElement, key: &str) -> Option<String> {
        element
            .attribute(key)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }

    /// Get a boolean attribute, defaulting to `false`
    pub fn get_bool_attribute(element: &OpaqueElement, key: &str) -> Result<bool> {
        match element.attribute(key).map(str::trim) {
            None | Some("") => Ok(false),
            Some(v) if v.eq_ignore_ascii_case("true") => Ok(true),
            Some(v) if v.eq_ignore_ascii_case("false") => Ok(false),
            Some(v) => Err(ParseError::InvalidValue {
                field: key.to_string(),
                message: format!("expected true or false, got '{}'", v),
            }),
        }
    }

    /// Trimmed text of the `text` child, if present
    pub fn get_text_child(element: &OpaqueElement) -> Option<String> {
        element.child("text").map(|t| t.text_content().trim().to_string())
    }

    /// Qualify a local name with an optional namespace prefix
    pub fn qualify(prefix: Option<&str>, local: &str) -> String {
        match prefix {
            Some(p) if !p.is_empty() => format!("{}:{}", p, local),
            _ => local.to_string(),
        }
    }

    /// Build `<name><text>value</text></name>`
    pub fn text_element(prefix: Option<&str>, name: &str, value: &str) -> OpaqueElement {
        let mut text = OpaqueElement::new(Self::qualify(prefix, "text"));
        if !value.is_empty() {
            text.children.push(OpaqueNode::Text(value.to_string()));
        }
        let mut element = OpaqueElement::new(Self::qualify(prefix, name));
        element.children.push(OpaqueNode::Element(text));
        element
    }

    /// Namespace prefix of a qualified name
    pub fn prefix_of(name: &str) -> Option<&str> {
        name.rfind(':').map(|idx| &name[..idx])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested_with_text() {
        let xml = r#"<?xml version="1.0"?>
            <dmn:rule id="r1">
              <dmn:inputEntry><dmn:text>&gt;= 700</dmn:text></dmn:inputEntry>
              <dmn:outputEntry/>
            </dmn:rule>"#;

        let root = XmlParser::parse(xml).unwrap();
        assert_eq!(root.name, "dmn:rule");
        assert_eq!(root.attribute("id"), Some("r1"));
        assert_eq!(root.elements().count(), 2);

        let entry = root.child("inputEntry").unwrap();
        assert_eq!(XmlParser::get_text_child(entry).as_deref(), Some(">= 700"));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(XmlParser::parse("   "), Err(ParseError::EmptyDocument));
        assert!(matches!(XmlParser::parse("<a><b></a>"), Err(ParseError::Xml(_))));
        assert!(matches!(XmlParser::parse("<a>"), Err(ParseError::Xml(_))));
        assert!(matches!(XmlParser::parse("<a/><b/>"), Err(ParseError::Xml(_))));
    }

    #[test]
    fn test_write_escapes_and_reparses() {
        let mut root = OpaqueElement::new("note");
        root.attributes.push(("title".to_string(), "a \"quoted\" & <tagged>".to_string()));
        root.children.push(OpaqueNode::Element(XmlParser::text_element(
            None,
            "body",
            "x < 10 && y > 2",
        )));

        let xml = XmlParser::write(&root, true).unwrap();
        assert!(xml.starts_with("<?xml"));

        let reparsed = XmlParser::parse(&xml).unwrap();
        assert_eq!(reparsed, root);
    }

    #[test]
    fn test_bool_attribute() {
        let mut element = OpaqueElement::new("itemComponent");
        assert!(!XmlParser::get_bool_attribute(&element, "isCollection").unwrap());

        element.attributes.push(("isCollection".to_string(), "true".to_string()));
        assert!(XmlParser::get_bool_attribute(&element, "isCollection").unwrap());

        element.attributes[0].1 = "maybe".to_string();
        assert!(XmlParser::get_bool_attribute(&element, "isCollection").is_err());
    }

    #[test]
    fn test_qualify() {
        assert_eq!(XmlParser::qualify(Some("dmn"), "rule"), "dmn:rule");
        assert_eq!(XmlParser::qualify(None, "rule"), "rule");
        assert_eq!(XmlParser::prefix_of("dmn:definitions"), Some("dmn"));
        assert_eq!(XmlParser::prefix_of("definitions"), None);
    }
}

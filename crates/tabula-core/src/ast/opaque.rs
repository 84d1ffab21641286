//! Opaque document elements
//!
//! Elements the typed model does not interpret (diagram interchange,
//! knowledge models, annotations, ...) are kept as a small element tree so
//! they can be written back in place.

use serde::{Deserialize, Serialize};

/// An element carried through parsing and serialization without interpretation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpaqueElement {
    /// Qualified element name as it appeared in the document (e.g. `dmndi:DMNDI`)
    pub name: String,

    /// Attributes in document order
    pub attributes: Vec<(String, String)>,

    /// Child nodes in document order
    pub children: Vec<OpaqueNode>,
}

/// A child of an opaque element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum OpaqueNode {
    Element(OpaqueElement),
    Text(String),
}

impl OpaqueElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Element name without its namespace prefix
    pub fn local_name(&self) -> &str {
        local_part(&self.name)
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Child elements, skipping text nodes
    pub fn elements(&self) -> impl Iterator<Item = &OpaqueElement> {
        self.children.iter().filter_map(|node| match node {
            OpaqueNode::Element(e) => Some(e),
            OpaqueNode::Text(_) => None,
        })
    }

    /// First direct child with the given local name
    pub fn child(&self, local: &str) -> Option<&OpaqueElement> {
        self.elements().find(|e| e.local_name() == local)
    }

    /// Concatenated text of this element and all descendants
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(self, &mut out);
        out
    }
}

fn collect_text(element: &OpaqueElement, out: &mut String) {
    for node in &element.children {
        match node {
            OpaqueNode::Text(t) => out.push_str(t),
            OpaqueNode::Element(e) => collect_text(e, out),
        }
    }
}

/// Strip a namespace prefix from a qualified name
pub fn local_part(name: &str) -> &str {
    match name.rfind(':') {
        Some(idx) => &name[idx + 1..],
        None => name,
    }
}

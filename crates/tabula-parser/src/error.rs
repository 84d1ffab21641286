//! Parser error types

use thiserror::Error;

/// Parser error
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    /// Malformed XML
    #[error("XML error: {0}")]
    Xml(String),

    /// The document is blank or has no root element
    #[error("Document is empty")]
    EmptyDocument,

    /// The root element is not the one expected
    #[error("Unexpected root element: expected <{expected}>, found <{found}>")]
    UnexpectedRoot { expected: String, found: String },

    /// Missing required element
    #[error("Missing required element: <{element}>")]
    MissingElement { element: String },

    /// Missing required attribute
    #[error("Missing required attribute '{attribute}' on <{element}>")]
    MissingAttribute { element: String, attribute: String },

    /// Invalid attribute or text value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

impl ParseError {
    pub(crate) fn xml<E: std::fmt::Display>(err: E) -> Self {
        ParseError::Xml(err.to_string())
    }
}

/// Result type for parser operations
pub type Result<T> = std::result::Result<T, ParseError>;

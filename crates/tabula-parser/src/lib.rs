//! Tabula Parser - DMN XML parser and writer for the Tabula decision-table engine
//!
//! This crate converts DMN `definitions` documents into the typed model from
//! `tabula-core` and back, and does the same for standalone `decisionTable`
//! fragments used when a single table is fetched or replaced.

pub mod error;
pub mod model_parser;
pub mod model_writer;
pub mod table_parser;
pub mod table_writer;
pub mod xml_parser;

// Re-export main parser types
pub use error::{ParseError, Result};
pub use model_parser::ModelParser;
pub use model_writer::ModelWriter;
pub use table_parser::DecisionTableParser;
pub use table_writer::DecisionTableWriter;
pub use xml_parser::XmlParser;

/// Namespace written for documents and fragments that do not declare one
pub const DMN_NAMESPACE: &str = "http://www.omg.org/spec/DMN/20180521/MODEL/";

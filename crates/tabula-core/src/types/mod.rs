//! Type system for Tabula
//!
//! This module contains:
//! - Value types for facts and results
//! - Schema nodes and the resolver that expands declared types

pub mod schema;
pub mod value;

pub use schema::{SchemaField, SchemaNode, SchemaResolver};
pub use value::Value;

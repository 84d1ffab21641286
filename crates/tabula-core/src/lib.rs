//! Tabula Core - Core types and definitions for the Tabula decision-table engine
//!
//! This crate provides the fundamental types shared by every other crate:
//! - Value types for facts and decision results
//! - The typed model AST (models, type definitions, decisions, rule tables)
//! - Unary-test syntax used by rule entries
//! - Schema resolution for declared types
//! - The compiled artifact consumed by the runtime
//! - Error types

pub mod ast;
pub mod error;
pub mod ir;
pub mod types;
pub mod unary;

// Re-export commonly used types
pub use ast::{
    Aggregation, Decision, FieldDefinition, HitPolicy, InputColumn, InputDeclaration, Model,
    ModelId, OpaqueElement, OutputColumn, Rule, RuleTable, TypeDefinition,
};
pub use error::{CoreError, Result};
pub use ir::{CompiledArtifact, CompiledDecision, CompiledModel, CompiledRule, CompiledTable};
pub use types::{SchemaField, SchemaNode, SchemaResolver, Value};
pub use unary::{Comparator, Operand, OutputEntry, UnaryTest, UnaryTestParser};

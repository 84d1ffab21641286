//! Typed model definitions
//!
//! This module contains the in-memory form of a decision model document:
//! - Models, input declarations and decisions
//! - Structured type definitions
//! - Rule tables, their columns and rules
//! - Opaque elements carried through untouched

pub mod item;
pub mod model;
pub mod opaque;
pub mod table;

pub use item::{FieldDefinition, TypeDefinition};
pub use model::{Decision, InputDeclaration, Model, ModelId, ModelSlot, Variable};
pub use opaque::{OpaqueElement, OpaqueNode};
pub use table::{Aggregation, HitPolicy, InputColumn, InputExpression, OutputColumn, Rule, RuleTable};

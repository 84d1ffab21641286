//! Compiled representation of a model set
//!
//! The compiler lowers the typed model AST into this form: rule entries are
//! pre-parsed, decisions are ordered by their dependencies, and output
//! priorities are resolved. An artifact is immutable once built.

pub mod artifact;
pub mod table;

pub use artifact::{ArtifactMetadata, CompiledArtifact, CompiledDecision, CompiledModel};
pub use table::{CompiledInput, CompiledOutput, CompiledRule, CompiledTable};

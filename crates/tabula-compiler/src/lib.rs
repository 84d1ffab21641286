//! Tabula Compiler - Model to artifact compiler
//!
//! This crate validates models and compiles their rule tables into the
//! immutable `CompiledArtifact` the runtime evaluates. Validation problems
//! are aggregated into a single `BuildErrors` value.

pub mod compiler;
pub mod dependency;
pub mod error;
pub mod table_compiler;

// Re-export main types
pub use compiler::{Compiler, CompilerOptions};
pub use error::{BuildErrors, CompileError, EntryKind, Result};
pub use table_compiler::TableCompiler;

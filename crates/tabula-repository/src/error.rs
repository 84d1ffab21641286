//! Error types for the repository layer

use std::path::PathBuf;
use tabula_core::CoreError;
use thiserror::Error;

/// Result type alias for repository operations
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Errors that can occur during repository operations
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// No model with that name
    #[error("Model not found: {model}")]
    ModelNotFound { model: String },

    /// The model has no decision with that name
    #[error("Decision not found: {decision} in model {model}")]
    DecisionNotFound { model: String, decision: String },

    /// A submitted table is missing or malformed
    #[error("Validation error: {0}")]
    Validation(String),

    /// A type definition refers back to itself
    #[error("{0}")]
    SchemaCycle(CoreError),

    /// Document not found at the given location
    #[error("Document not found: {location}")]
    NotFound { location: String },

    /// I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Parser error from tabula-parser
    #[error("Parser error: {0}")]
    Parser(String),

    /// Invalid path provided
    #[error("Invalid path: {path}")]
    InvalidPath { path: PathBuf },

    /// JSON serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error
    #[error("Repository error: {0}")]
    Other(String),
}

impl From<tabula_parser::ParseError> for RepositoryError {
    fn from(err: tabula_parser::ParseError) -> Self {
        RepositoryError::Parser(err.to_string())
    }
}

impl From<CoreError> for RepositoryError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::SchemaCycle { .. } => RepositoryError::SchemaCycle(err),
            other => RepositoryError::Other(other.to_string()),
        }
    }
}

//! SDK error types

use thiserror::Error;

/// SDK error type
#[derive(Error, Debug)]
pub enum SdkError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Repository error (lookups, validation, storage)
    #[error(transparent)]
    Repository(#[from] tabula_repository::RepositoryError),

    /// The model set failed to compile
    #[error(transparent)]
    Build(#[from] tabula_compiler::BuildErrors),

    /// Runtime error
    #[error("Runtime error: {0}")]
    RuntimeError(#[from] tabula_runtime::RuntimeError),

    /// Another edit or reload holds the build lock
    #[error("Build in progress")]
    BuildInProgress,
}

impl SdkError {
    /// Whether the error is a missing model or decision
    pub fn is_not_found(&self) -> bool {
        use tabula_repository::RepositoryError;
        matches!(
            self,
            SdkError::Repository(
                RepositoryError::ModelNotFound { .. } | RepositoryError::DecisionNotFound { .. }
            )
        )
    }
}

/// Result type for SDK operations
pub type Result<T> = std::result::Result<T, SdkError>;

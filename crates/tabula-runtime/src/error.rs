//! Runtime error types

use tabula_core::CoreError;
use thiserror::Error;

/// Runtime error
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RuntimeError {
    /// The active artifact holds no models
    #[error("No models available")]
    NoModelsAvailable,

    /// Type error
    #[error("Type error: {0}")]
    TypeError(String),

    /// Entry the predicate evaluator cannot interpret
    #[error("Unsupported entry: {0}")]
    UnsupportedEntry(String),

    /// The matched rules break the table's hit policy
    #[error("Hit policy {policy} violated: {message}")]
    HitPolicyViolation { policy: String, message: String },

    /// Releasing evaluator resources failed
    #[error("Release failed: {0}")]
    ReleaseFailed(String),
}

impl From<CoreError> for RuntimeError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::TypeError(message) => RuntimeError::TypeError(message),
            other => RuntimeError::TypeError(other.to_string()),
        }
    }
}

/// Result type for runtime operations
pub type Result<T> = std::result::Result<T, RuntimeError>;

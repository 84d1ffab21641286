//! Server error types

use serde::Serialize;
use tabula_sdk::{RepositoryError, SdkError};
use thiserror::Error;

/// Server error type
#[derive(Error, Debug)]
pub enum ServerError {
    /// The request line is not a valid command
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Unknown model or decision
    #[error("Not found: {0}")]
    NotFound(String),

    /// Another edit or reload is building
    #[error("Build in progress")]
    Busy,

    /// The model set failed to compile
    #[error("{0}")]
    BuildFailed(String),

    /// Decision service error
    #[error("Engine error: {0}")]
    EngineError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Error body of a failed response
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub kind: &'static str,
    pub message: String,
}

impl ServerError {
    /// Stable, machine-readable kind
    pub fn kind(&self) -> &'static str {
        match self {
            ServerError::InvalidRequest(_) => "invalid_request",
            ServerError::NotFound(_) => "not_found",
            ServerError::Busy => "build_in_progress",
            ServerError::BuildFailed(_) => "build_failed",
            ServerError::EngineError(_) => "engine_error",
            ServerError::InternalError(_) => "internal_error",
        }
    }

    pub fn to_body(&self) -> ErrorBody {
        ErrorBody {
            kind: self.kind(),
            message: self.to_string(),
        }
    }
}

impl From<SdkError> for ServerError {
    fn from(err: SdkError) -> Self {
        if err.is_not_found() {
            return ServerError::NotFound(err.to_string());
        }
        match err {
            SdkError::BuildInProgress => ServerError::Busy,
            SdkError::Build(errors) => ServerError::BuildFailed(errors.to_string()),
            SdkError::Repository(RepositoryError::Validation(message)) => {
                ServerError::InvalidRequest(message)
            }
            other => ServerError::EngineError(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for ServerError {
    fn from(err: serde_json::Error) -> Self {
        ServerError::InternalError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_mapping() {
        let err: ServerError = SdkError::Repository(RepositoryError::ModelNotFound {
            model: "loan".to_string(),
        })
        .into();
        assert_eq!(err.kind(), "not_found");
        assert_eq!(err.to_string(), "Not found: Model not found: loan");
    }

    #[test]
    fn test_validation_is_invalid_request() {
        let err: ServerError =
            SdkError::Repository(RepositoryError::Validation("empty table".to_string())).into();
        assert_eq!(
            err.to_body(),
            ErrorBody {
                kind: "invalid_request",
                message: "Invalid request: empty table".to_string(),
            }
        );
    }

    #[test]
    fn test_build_in_progress() {
        let err: ServerError = SdkError::BuildInProgress.into();
        assert_eq!(err.kind(), "build_in_progress");
    }

    #[test]
    fn test_engine_error_display() {
        let err = ServerError::EngineError("No models available".to_string());
        assert_eq!(err.to_string(), "Engine error: No models available");
        assert_eq!(err.kind(), "engine_error");
    }
}

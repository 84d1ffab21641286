//! Error types for Tabula Core

use thiserror::Error;

/// Core error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// A structured type refers back to itself along the expansion path
    #[error("Schema cycle detected: {}", .path.join(" -> "))]
    SchemaCycle { path: Vec<String> },

    #[error("Type error: {0}")]
    TypeError(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_cycle_display() {
        let err = CoreError::SchemaCycle {
            path: vec!["Node".to_string(), "Child".to_string(), "Node".to_string()],
        };
        assert_eq!(err.to_string(), "Schema cycle detected: Node -> Child -> Node");
    }

    #[test]
    fn test_type_error_display() {
        let err = CoreError::TypeError("cannot compare number with string".to_string());
        assert_eq!(err.to_string(), "Type error: cannot compare number with string");
    }
}

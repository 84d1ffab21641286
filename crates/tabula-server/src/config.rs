//! Server configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tabula_sdk::EditPolicy;

/// Where model documents are loaded from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RepositoryType {
    /// Directory of `.dmn` documents
    FileSystem {
        /// Base path for models (default: "models")
        #[serde(default = "default_repository_path")]
        path: PathBuf,
    },
    /// Empty in-memory store
    Memory,
}

fn default_repository_path() -> PathBuf {
    PathBuf::from("models")
}

impl Default for RepositoryType {
    fn default() -> Self {
        RepositoryType::FileSystem {
            path: default_repository_path(),
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Repository configuration for loading models
    pub repository: RepositoryType,

    /// Model evaluated when present, by name or namespace
    pub default_model: Option<String>,

    /// Edits arriving during a build wait or fail
    pub edit_policy: EditPolicy,

    /// Back up documents before overwriting them
    pub backups: bool,

    /// Accept entries outside the built-in unary-test syntax
    pub allow_expressions: bool,

    pub log_format: LogFormat,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            repository: RepositoryType::default(),
            default_model: None,
            edit_policy: EditPolicy::default(),
            backups: true,
            allow_expressions: false,
            log_format: LogFormat::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables and config file
    pub fn load() -> anyhow::Result<Self> {
        // Load .env file if exists
        dotenvy::dotenv().ok();

        // Nested keys use a double underscore: TABULA_REPOSITORY__PATH
        let config_result = config::Config::builder()
            .add_source(config::File::with_name("config/server").required(false))
            .add_source(
                config::Environment::with_prefix("TABULA")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build();

        match config_result {
            Ok(cfg) => cfg
                .try_deserialize()
                .map_err(|e| anyhow::anyhow!("Failed to deserialize config: {}", e)),
            Err(e) => {
                tracing::info!("No usable config source ({}), using default configuration", e);
                Ok(Self::default())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_config_default() {
        let config = ServerConfig::default();

        assert_eq!(config.repository, RepositoryType::default());
        assert!(config.default_model.is_none());
        assert_eq!(config.edit_policy, EditPolicy::Queue);
        assert!(config.backups);
        assert!(!config.allow_expressions);
        assert_eq!(config.log_format, LogFormat::Text);
    }

    #[test]
    fn test_repository_type_default() {
        let repo = RepositoryType::default();

        if let RepositoryType::FileSystem { path } = repo {
            assert_eq!(path, PathBuf::from("models"));
        } else {
            panic!("Expected FileSystem repository type");
        }
    }

    #[test]
    fn test_deserialize_partial_config() {
        let config: ServerConfig = serde_json::from_str(
            r#"{
                "repository": { "type": "filesystem", "path": "/srv/models" },
                "edit_policy": "reject",
                "log_format": "json"
            }"#,
        )
        .unwrap();

        assert_eq!(
            config.repository,
            RepositoryType::FileSystem {
                path: PathBuf::from("/srv/models")
            }
        );
        assert_eq!(config.edit_policy, EditPolicy::Reject);
        assert_eq!(config.log_format, LogFormat::Json);
        assert!(config.backups);
    }

    #[test]
    fn test_deserialize_memory_repository() {
        let config: ServerConfig =
            serde_json::from_str(r#"{ "repository": { "type": "memory" } }"#).unwrap();
        assert_eq!(config.repository, RepositoryType::Memory);
    }
}

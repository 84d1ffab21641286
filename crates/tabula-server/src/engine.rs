//! Decision service initialization
//!
//! Converts the server configuration to SDK configuration and builds the
//! service through the SDK builder.

use crate::config::{RepositoryType, ServerConfig};
use anyhow::Result;
use tabula_sdk::{
    CompilerOptions, DecisionService, DecisionServiceBuilder, EngineConfig, RepositoryConfig,
};
use tracing::info;

/// SDK configuration equivalent to `config`
pub fn engine_config(config: &ServerConfig) -> EngineConfig {
    let repository = match &config.repository {
        RepositoryType::FileSystem { path } => {
            RepositoryConfig::file_system(path.to_string_lossy().to_string())
        }
        RepositoryType::Memory => RepositoryConfig::memory(),
    }
    .with_backups(config.backups);

    let mut engine = EngineConfig::new()
        .with_repository(repository)
        .with_edit_policy(config.edit_policy)
        .with_compiler_options(CompilerOptions {
            allow_expressions: config.allow_expressions,
        });
    if let Some(model) = &config.default_model {
        engine = engine.with_default_model(model.clone());
    }
    engine
}

/// Initialize the decision service
pub async fn init_service(config: &ServerConfig) -> Result<DecisionService> {
    let service = DecisionServiceBuilder::new()
        .with_config(engine_config(config))
        .build()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to initialize decision service: {}", e))?;

    info!(
        "Decision service ready: {} models, artifact v{}",
        service.list_models().await.len(),
        service.active_version()
    );
    Ok(service)
}

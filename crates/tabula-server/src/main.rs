//! Tabula Decision-Table Engine Host
//!
//! Reads JSON commands from stdin, one per line, and writes one JSON
//! response per line to stdout. Logs go to stderr.

use anyhow::Result;
use tabula_server::config::{LogFormat, ServerConfig};
use tabula_server::{engine, protocol};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = ServerConfig::load()?;

    // Initialize tracing
    init_tracing(config.log_format)?;
    info!("Loaded configuration: {:?}", config);

    // Initialize decision service
    let service = engine::init_service(&config).await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    info!("Reading commands from stdin");

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let response = protocol::handle_line(&service, &line).await;
        stdout.write_all(response.as_bytes()).await?;
        stdout.write_all(b"\n").await?;
        stdout.flush().await?;
    }

    info!("Input closed, shutting down");
    Ok(())
}

/// Initialize tracing subscriber
fn init_tracing(format: LogFormat) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "tabula_server=info,tabula_sdk=info,tabula_repository=info,tabula_runtime=info".into()
    });

    let registry = tracing_subscriber::registry().with(filter);
    let result = match format {
        LogFormat::Text => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .try_init(),
    };

    result.map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {}", e))
}

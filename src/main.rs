//! Kimi Possible - HTTP Server Entry Point
//!
//! Starts the HTTP server that exposes the chat API.

use kimi_possible::{api, config::Config, tools::ToolKind};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kimi_possible=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    info!("Loaded configuration: model={}", kimi_possible::llm::MODEL);
    if config.credentials.openrouter_api_key.is_none() {
        warn!("OPENROUTER_API_KEY is not configured; chat requests will fail");
    }
    for kind in ToolKind::ALL {
        if config.credentials.for_tool(kind).is_none() {
            warn!("{} not configured; {} is disabled", kind.credential_name(), kind);
        }
    }

    // Start HTTP server
    let addr = format!("{}:{}", config.host, config.port);
    info!("Starting server on {}", addr);

    api::serve(config).await?;

    Ok(())
}

use anyhow::{Context, Result};
use etcetera::{choose_app_strategy, AppStrategy};
use rmcp::{transport::stdio, ServiceExt};
use std::env;
use std::fs;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use ai_assistant::config::{self, Config};
use ai_assistant::providers::OpenRouterProvider;
use ai_assistant::AssistantServer;

/// Logs go to stderr and a daily-rolling file under the app data directory.
/// stdout carries the MCP protocol stream and must stay clean.
fn setup_logging() -> Result<WorkerGuard> {
    let strategy = choose_app_strategy(config::APP_STRATEGY.clone())
        .context("Could not determine data directory for logs")?;
    let log_dir = strategy.in_data_dir("logs");
    fs::create_dir_all(&log_dir)?;

    let file_appender = tracing_appender::rolling::daily(&log_dir, "ai-assistant.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // RUST_LOG wins when set; otherwise DEBUG=1 switches to debug verbosity.
    let default_level = if env::var("DEBUG").is_ok_and(|v| v == "1") {
        "debug"
    } else {
        "info"
    };
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level.to_string()));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .with(env_filter)
        .init();

    Ok(guard)
}

#[tokio::main]
async fn main() -> Result<()> {
    let _guard = setup_logging()?;

    let config = Config::load()?;
    tracing::info!("Configuration loaded successfully");

    let api_key = config.api_key()?;
    let provider = OpenRouterProvider::new(api_key)?;

    tracing::info!("Starting AI Assistant MCP Server...");
    tracing::info!("Available models: {}", config.model_list());
    tracing::info!("Default model: {}", config.default_model);

    let server = AssistantServer::new(config, provider);
    let service = server.serve(stdio()).await.inspect_err(|e| {
        tracing::error!("serving error: {:?}", e);
    })?;

    service.waiting().await?;

    Ok(())
}

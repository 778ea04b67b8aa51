use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use vault_rest_core::VaultClient;
use vault_rest_mcp::settings::{config_candidates, load_env_file};
use vault_rest_mcp::{McpServer, Settings};

// Stdout carries the protocol, so logs go to stderr and optionally a file.
fn init_logging(log_file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let file_layer = match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;
            Some(fmt::layer().with_writer(Arc::new(file)).with_ansi(false))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(false)
                .compact(),
        )
        .with(file_layer)
        .with(filter)
        .init();

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let env_file = load_env_file(&config_candidates())?;
    let settings = Settings::parse();
    init_logging(settings.log_file.as_deref())?;

    match &env_file {
        Some(path) => info!(path = %path.display(), "loaded config file"),
        None => debug!("no config file found"),
    }

    let config = settings.client_config();
    if config.insecure_tls {
        warn!("TLS certificate verification is disabled");
    }

    let client = VaultClient::new(&config).context("failed to create vault client")?;
    let server = Arc::new(McpServer::new(Arc::new(client)).with_log_file(settings.log_file.clone()));

    info!(host = %config.api_host, "starting MCP server on stdio");

    tokio::select! {
        result = server.serve(tokio::io::stdin(), tokio::io::stdout()) => result?,
        _ = tokio::signal::ctrl_c() => info!("interrupted, shutting down"),
    }

    Ok(())
}

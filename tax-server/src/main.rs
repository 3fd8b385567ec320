use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use tax_server::{AppState, ServiceConfig, build_router, logging};

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Progressive income tax calculator service.
///
/// Serves `GET /calculate-tax?annual_income=..&tax_year=..`, pulling bracket
/// data from the configured upstream tax-data API.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Service configuration file (JSON, or TOML when the extension is `.toml`).
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,

    /// Address to listen on; overrides `bind_address` from the config file.
    #[arg(long)]
    bind: Option<String>,

    /// Also append log records to this file.
    #[arg(long)]
    log_file: Option<PathBuf>,
}

// ─── entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = ServiceConfig::load(&cli.config)
        .with_context(|| format!("Failed to load config: {}", cli.config.display()))?;

    logging::init_logging(&config.log_level, cli.log_file.as_deref())?;

    info!(
        "Starting tax-server v{} (upstream {}, years {:?}, cache {} entries, {} attempts)",
        env!("CARGO_PKG_VERSION"),
        config.tax_api_url,
        config.supported_tax_years,
        config.cache_max_size,
        config.tax_api_max_retries
    );

    let state = AppState::from_config(&config).context("Failed to set up bracket provider")?;
    let app = build_router(state);

    let bind = cli.bind.unwrap_or_else(|| config.bind_address.clone());
    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("Failed to bind {bind}"))?;
    info!("tax-server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("tax-server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!(?error, "failed to listen for shutdown signal");
    }
}

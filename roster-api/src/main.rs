//! roster-api - Enrollment sheet service
//!
//! Pulls a published Google Sheet as CSV, normalizes its rows into
//! enrollment records and serves dashboard projections from memory.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use roster_common::config::{ConfigOverrides, ServiceConfig, TomlConfig};
use roster_common::fetcher::HttpSheetSource;
use roster_common::{CacheStore, SyncOrchestrator};
use roster_api::api::buildinfo::BuildInfo;
use roster_api::{build_router, startup, AppState};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for roster-api
#[derive(Parser, Debug)]
#[command(name = "roster-api")]
#[command(about = "Enrollment sheet ingestion and dashboard API")]
#[command(version)]
struct Args {
    /// Google spreadsheet id (builds the CSV export URL)
    #[arg(long, env = "GOOGLE_SPREADSHEET_ID")]
    spreadsheet_id: Option<String>,

    /// Sheet tab gid
    #[arg(long, env = "GOOGLE_SHEET_GID")]
    sheet_gid: Option<String>,

    /// Full CSV URL, wins over the spreadsheet id
    #[arg(long, env = "ENROLLMENT_CSV_URL")]
    csv_url: Option<String>,

    /// Address to bind
    #[arg(long, env = "ROSTER_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,

    /// Upstream fetch timeout in seconds
    #[arg(long)]
    fetch_timeout_secs: Option<u64>,

    /// Re-sync period in seconds (0 disables)
    #[arg(long)]
    refresh_interval_secs: Option<u64>,

    /// Log level when RUST_LOG is unset
    #[arg(long)]
    log_level: Option<String>,

    /// Config file (defaults to ~/.config/roster/config.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            spreadsheet_id: self.spreadsheet_id.clone(),
            sheet_gid: self.sheet_gid.clone(),
            csv_url: self.csv_url.clone(),
            host: self.host.clone(),
            port: self.port,
            fetch_timeout_secs: self.fetch_timeout_secs,
            refresh_interval_secs: self.refresh_interval_secs,
            log_level: self.log_level.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Read before tracing exists so the file's log level can apply
    let toml_config = TomlConfig::load(args.config.as_deref())?;
    let log_level = args
        .log_level
        .clone()
        .unwrap_or_else(|| toml_config.logging.level.clone());

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{},tower_http=debug", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Build identification first, before any network work
    info!("Starting {}", BuildInfo::current());

    let config = ServiceConfig::resolve(args.overrides(), toml_config)?;
    info!(url = %config.csv_url, "Sheet source configured");

    let source = HttpSheetSource::new(config.csv_url.clone(), config.fetch_timeout)
        .context("Failed to build HTTP client")?;
    let store = Arc::new(CacheStore::new());
    let orchestrator = Arc::new(SyncOrchestrator::new(
        store,
        Arc::new(source),
        config.progress_fallback,
    ));

    // Serve immediately; the first sync fills the cache in the background
    tokio::spawn({
        let orchestrator = Arc::clone(&orchestrator);
        async move {
            let origin = startup::initial_sync(&orchestrator).await;
            info!(origin = ?origin, "Initial sync finished");
        }
    });

    let refresh = config
        .refresh_interval
        .map(|period| Arc::clone(&orchestrator).spawn_interval_refresh(period));

    let app = build_router(AppState::new(orchestrator));

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("roster-api listening on http://{}", addr);
    info!("Health check: http://{}/api/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    if let Some(handle) = refresh {
        handle.abort();
    }
    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received terminate signal, shutting down"),
    }
}

//! ahp-ca (Criteria Analysis) - Main entry point
//!
//! Upload service for AHP pairwise-comparison tables. Each uploaded table is
//! analyzed per respondent, consistent respondents are aggregated, and the
//! results are returned as JSON plus a downloadable report document.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ahp_ca::{build_router, AppState};
use ahp_common::config::{ConfigOverrides, ServiceConfig};

/// Command-line arguments for ahp-ca
#[derive(Parser, Debug)]
#[command(name = "ahp-ca")]
#[command(about = "AHP criteria analysis service")]
#[command(version)]
struct Args {
    /// TOML configuration file
    #[arg(short, long, env = "AHP_CA_CONFIG")]
    config: Option<PathBuf>,

    /// Interface to bind
    #[arg(short, long, env = "AHP_CA_BIND")]
    bind: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "AHP_CA_PORT")]
    port: Option<u16>,

    /// Directory generated reports are written to
    #[arg(short, long, env = "AHP_CA_REPORTS_DIR")]
    reports_dir: Option<PathBuf>,

    /// Log level when RUST_LOG is not set
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Resolve configuration before tracing so the configured level applies
    let config = ServiceConfig::load(ConfigOverrides {
        config_path: args.config,
        bind: args.bind,
        port: args.port,
        reports_dir: args.reports_dir,
        log_level: args.log_level,
    })
    .context("Failed to load configuration")?;

    // Initialize tracing
    let level = &config.log_level;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("ahp_ca={level},ahp_common={level},tower_http={level}").into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Log build identification immediately after tracing init
    info!(
        "Starting AHP Criteria Analysis (ahp-ca) v{} [{}] built {}",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP")
    );
    info!("Reports directory: {}", config.reports_dir.display());
    info!("Allowed origins: {}", config.allowed_origins.join(", "));

    tokio::fs::create_dir_all(&config.reports_dir)
        .await
        .with_context(|| {
            format!(
                "Failed to create reports directory {}",
                config.reports_dir.display()
            )
        })?;

    let addr = config.listen_addr();
    let app = build_router(AppState::new(config));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("ahp-ca listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}

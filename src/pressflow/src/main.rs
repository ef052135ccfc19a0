//! PressFlow server binary.
//!
//! Main entry point: configuration, demo seed, and server startup.

use clap::Parser;
use pressflow_api::{ApiServer, AppState};
use pressflow_core::AppConfig;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "pressflow")]
#[command(about = "PR/email-campaign management backend")]
#[command(version)]
struct Cli {
    /// HTTP port (overrides config)
    #[arg(long, env = "PRESSFLOW__API__HTTP_PORT")]
    http_port: Option<u16>,

    /// Bind host (overrides config)
    #[arg(long, env = "PRESSFLOW__API__HOST")]
    host: Option<String>,

    /// Seed demo data (accounts, directories, campaigns) at startup
    #[arg(long, default_value_t = false)]
    seed: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pressflow=info,tower_http=info".into()),
        )
        .json()
        .init();

    let cli = Cli::parse();

    info!("PressFlow starting up");

    // Load configuration
    let mut config = AppConfig::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to load config, using defaults");
        AppConfig::default()
    });

    // Apply CLI overrides
    if let Some(port) = cli.http_port {
        config.api.http_port = port;
    }
    if let Some(host) = cli.host {
        config.api.host = host;
    }

    info!(
        host = %config.api.host,
        http_port = config.api.http_port,
        metrics_port = config.metrics.port,
        "Configuration loaded"
    );

    let state = AppState::new(config);

    if cli.seed {
        state.seed_demo_data()?;
        info!("Demo data seeded (admin@pressflow.io / admin123)");
    }

    let server = ApiServer::new(state);

    // Start metrics exporter
    if let Err(e) = server.start_metrics().await {
        error!(error = %e, "Failed to start metrics exporter");
    }

    info!("PressFlow is ready to serve traffic");

    // Start HTTP server (blocks until shutdown)
    server.start_http().await?;

    Ok(())
}

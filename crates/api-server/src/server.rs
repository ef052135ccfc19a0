//! API server startup: HTTP listener and the Prometheus exporter.

use crate::router::api_router;
use crate::state::AppState;
use std::net::SocketAddr;
use tracing::info;

pub struct ApiServer {
    state: AppState,
}

impl ApiServer {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    /// Start the HTTP server; blocks until shutdown.
    pub async fn start_http(&self) -> anyhow::Result<()> {
        let config = &self.state.config.api;
        let addr = SocketAddr::new(config.host.parse()?, config.http_port);

        let app = api_router(self.state.clone());

        info!(addr = %addr, "Starting HTTP server");
        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }

    /// Start the metrics exporter on its own port.
    pub async fn start_metrics(&self) -> anyhow::Result<()> {
        let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
        builder
            .with_http_listener(SocketAddr::new(
                self.state.config.api.host.parse()?,
                self.state.config.metrics.port,
            ))
            .install()?;

        info!(port = self.state.config.metrics.port, "Metrics exporter started");
        Ok(())
    }
}

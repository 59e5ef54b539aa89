//! Prometheus metrics exporter.
//!
//! Serves the counters recorded through `metrics` in Prometheus text format
//! at `http://<bind_addr>/metrics`. The exporter runs for the life of the
//! process once installed.

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;
use tracing::info;

use crate::metrics::{METRIC_ACCESS_TOKEN_REQUESTS_TOTAL, METRIC_TOKEN_RENEWALS_TOTAL};

/// Handle to an installed Prometheus exporter.
#[derive(Debug)]
pub struct MetricsExporter {
    bind_addr: SocketAddr,
}

impl MetricsExporter {
    /// Install the Prometheus exporter as the global metrics recorder.
    ///
    /// # Errors
    /// Returns an error if:
    /// - The bind address is invalid
    /// - Another recorder is already installed or the listener cannot start
    pub fn install(bind_addr: &str) -> Result<Self, MetricsExporterError> {
        let addr: SocketAddr = bind_addr
            .parse()
            .map_err(|e| MetricsExporterError::InvalidBindAddress(bind_addr.to_string(), e))?;

        PrometheusBuilder::new()
            .with_http_listener(addr)
            .install()
            .map_err(|e| MetricsExporterError::BuildError(e.to_string()))?;

        metrics::describe_counter!(
            METRIC_TOKEN_RENEWALS_TOTAL,
            "Vault token renewal attempts by outcome"
        );
        metrics::describe_counter!(
            METRIC_ACCESS_TOKEN_REQUESTS_TOTAL,
            "OAuth access token requests by outcome"
        );

        info!(
            "Prometheus metrics exporter started on http://{}/metrics",
            addr
        );

        Ok(Self { bind_addr: addr })
    }

    /// Get the bind address.
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}

/// Errors that can occur when installing the metrics exporter.
#[derive(Debug, thiserror::Error)]
pub enum MetricsExporterError {
    /// Invalid bind address provided.
    #[error("Invalid bind address '{0}': {1}")]
    InvalidBindAddress(String, std::net::AddrParseError),

    /// Failed to build the Prometheus recorder.
    #[error("Failed to build Prometheus recorder: {0}")]
    BuildError(String),
}

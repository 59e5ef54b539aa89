//! Metrics for token renewal and OAuth token exchange.
//!
//! # What this module does NOT handle:
//! - Metrics exposition/export (see `metrics_exporter.rs`)
//!
//! # Invariants
//! - Renewal outcomes use the single label `outcome`.
//! - Metric recording is infallible and never disrupts renewal or requests.
//! - Zero-cost when no metrics recorder is installed

/// Counter of Vault token renewal attempts, labelled by `outcome`.
pub const METRIC_TOKEN_RENEWALS_TOTAL: &str = "config_client_token_renewals_total";

/// Counter of OAuth access token requests, labelled by `outcome`.
pub const METRIC_ACCESS_TOKEN_REQUESTS_TOTAL: &str = "config_client_access_token_requests_total";

/// Result of a single renewal attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenewalOutcome {
    /// Server answered 200.
    Renewed,
    /// Server answered with any other status.
    Rejected(u16),
    /// The request could not be completed.
    Failed,
}

impl RenewalOutcome {
    /// Returns the metric label for this outcome.
    pub const fn as_str(&self) -> &'static str {
        match self {
            RenewalOutcome::Renewed => "renewed",
            RenewalOutcome::Rejected(_) => "rejected",
            RenewalOutcome::Failed => "failed",
        }
    }
}

/// Thin wrapper over the `metrics` macros with consistent labels.
#[derive(Debug, Clone)]
pub struct MetricsCollector {
    enabled: bool,
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self { enabled: true }
    }

    /// A collector that records nothing.
    pub fn disabled() -> Self {
        Self { enabled: false }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn record_renewal(&self, outcome: RenewalOutcome) {
        if !self.enabled {
            return;
        }
        metrics::counter!(METRIC_TOKEN_RENEWALS_TOTAL, "outcome" => outcome.as_str()).increment(1);
    }

    pub fn record_access_token_request(&self, success: bool) {
        if !self.enabled {
            return;
        }
        let outcome = if success { "success" } else { "failure" };
        metrics::counter!(METRIC_ACCESS_TOKEN_REQUESTS_TOTAL, "outcome" => outcome).increment(1);
    }
}

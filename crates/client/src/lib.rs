//! Spring Cloud Config Server client.
//!
//! This crate turns resolved [`ClientSettings`](cfgserver_config::ClientSettings)
//! into authenticated Config Server requests. It supports OAuth2
//! client-credentials bearer tokens, HTTP basic auth, and static Vault tokens
//! with automatic background renewal.

mod auth;
pub mod client;
pub mod endpoints;
pub mod error;
pub mod metrics;
pub mod metrics_exporter;
pub mod redact;
pub mod renewal;
pub mod tracing;
mod transport;

pub use auth::{AuthHeaders, BasicAuth, BearerAuth, CONFIG_TOKEN_HEADER, StaticTokenAuth};
pub use client::ConfigServerClient;
pub use client::builder::ConfigServerClientBuilder;
pub use error::{ClientError, Result};
pub use metrics::{MetricsCollector, RenewalOutcome};
pub use redact::redact_token;
pub use renewal::{TokenRenewalScheduler, TokenRenewer, VaultTokenRenewer};
pub use transport::{build_http_client, normalize_base_uri};

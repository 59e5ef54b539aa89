//! Config Server client.
//!
//! This module provides [`ConfigServerClient`], which owns the per-client
//! transport, the configured authentication header providers, and the Vault
//! token renewal schedule.
//!
//! # Submodules
//! - [`builder`]: Client construction from resolved settings
//!
//! # What this module does NOT handle:
//! - Fetching or parsing the Config Server environment document
//! - Retrying failed requests
//! - Settings resolution (see `cfgserver_config::SettingsResolver`)
//!
//! # Invariants
//! - Settings are shared read-only once the client is built.
//! - At most one renewal schedule exists per client; it stops when the client is dropped.

pub mod builder;

use std::sync::Arc;

use cfgserver_config::{ClientSettings, ConfigError};
use reqwest::RequestBuilder;
use tracing::debug;

use crate::auth::AuthHeaders;
use crate::endpoints::config_server_uri;
use crate::error::Result;
use crate::renewal::{TokenRenewalScheduler, VaultTokenRenewer};
use crate::tracing::inject_trace_context;

pub use builder::ConfigServerClientBuilder;

/// Client for a Spring Cloud Config Server.
///
/// # Creating a Client
///
/// ```rust,ignore
/// use cfgserver_client::ConfigServerClient;
///
/// let client = ConfigServerClient::builder(settings).build()?;
/// let request = client.request(None).await?;
/// ```
#[derive(Debug)]
pub struct ConfigServerClient {
    pub(crate) http: reqwest::Client,
    pub(crate) settings: Arc<ClientSettings>,
    pub(crate) base_uri: String,
    pub(crate) config_prefix: String,
    pub(crate) auth: Vec<Arc<dyn AuthHeaders>>,
    pub(crate) renewer: Option<Arc<VaultTokenRenewer>>,
    pub(crate) scheduler: Option<Arc<TokenRenewalScheduler>>,
}

impl ConfigServerClient {
    /// Start building a client for `settings`.
    pub fn builder(settings: ClientSettings) -> ConfigServerClientBuilder {
        ConfigServerClientBuilder::new(settings)
    }

    pub fn settings(&self) -> &Arc<ClientSettings> {
        &self.settings
    }

    /// First configured server URI without user-info or trailing slash.
    pub fn base_uri(&self) -> &str {
        &self.base_uri
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Configured authentication header providers, in the order they are applied.
    pub fn auth_providers(&self) -> &[Arc<dyn AuthHeaders>] {
        &self.auth
    }

    /// `<base>/<name>/<environment>[/<label>]`. `label` overrides the configured label.
    pub fn server_uri(&self, label: Option<&str>) -> Result<String> {
        let name = self
            .settings
            .name
            .as_deref()
            .filter(|n| !n.is_empty())
            .ok_or_else(|| ConfigError::MissingSetting {
                key: format!("{}:name", self.config_prefix),
            })?;
        let label = label.or(self.settings.label.as_deref());
        Ok(config_server_uri(
            &self.base_uri,
            name,
            &self.settings.environment,
            label,
        ))
    }

    /// Build a GET for the environment document with every auth header attached.
    ///
    /// A configured static token arms the renewal schedule on the first call.
    pub async fn request(&self, label: Option<&str>) -> Result<RequestBuilder> {
        let uri = self.server_uri(label)?;
        debug!(uri = %uri, providers = self.auth.len(), "Building config server request");

        let mut builder = self
            .http
            .get(&uri)
            .header(reqwest::header::ACCEPT, "application/json");
        for provider in &self.auth {
            builder = provider.attach(builder).await;
        }
        Ok(inject_trace_context(builder))
    }

    /// The Vault token renewer, if a static token is configured.
    pub fn renewer(&self) -> Option<&Arc<VaultTokenRenewer>> {
        self.renewer.as_ref()
    }

    /// The renewal schedule, if a static token is configured.
    pub fn renewal_scheduler(&self) -> Option<&Arc<TokenRenewalScheduler>> {
        self.scheduler.as_ref()
    }

    /// Arm the renewal schedule without making a request.
    pub fn start_renewal(&self) -> bool {
        self.scheduler.as_ref().is_some_and(|s| s.arm())
    }

    /// Stop the renewal schedule, if any.
    pub fn stop_renewal(&self) {
        if let Some(scheduler) = &self.scheduler {
            scheduler.stop();
        }
    }
}

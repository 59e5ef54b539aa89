//! Authentication header providers.
//!
//! Responsibilities:
//! - Define the `AuthHeaders` capability: decorate an outgoing request.
//! - Implement OAuth bearer, HTTP basic, and static Vault token providers.
//!
//! Does NOT handle:
//! - The renewal schedule itself (see `renewal.rs`); `StaticTokenAuth` only arms it.
//!
//! Invariants:
//! - Providers never fail a request. A bearer token that cannot be obtained is
//!   logged and the request proceeds without it.
//! - `Debug` output never contains secrets.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use secrecy::{ExposeSecret, SecretString};
use std::fmt;
use std::sync::Arc;
use tracing::warn;

use crate::endpoints::fetch_access_token;
use crate::metrics::MetricsCollector;
use crate::redact::redact_token;
use crate::renewal::TokenRenewalScheduler;

/// Header carrying the static Vault token on Config Server requests.
pub const CONFIG_TOKEN_HEADER: &str = "X-Config-Token";

/// Attaches authentication headers to a request.
#[async_trait]
pub trait AuthHeaders: Send + Sync + fmt::Debug {
    /// Short name for diagnostics.
    fn name(&self) -> &'static str;

    async fn attach(&self, builder: RequestBuilder) -> RequestBuilder;
}

/// OAuth2 client-credentials bearer token, fetched per request.
pub struct BearerAuth {
    http: Client,
    access_token_uri: String,
    client_id: String,
    client_secret: SecretString,
    metrics: MetricsCollector,
}

impl fmt::Debug for BearerAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BearerAuth")
            .field("access_token_uri", &self.access_token_uri)
            .field("client_id", &self.client_id)
            .finish_non_exhaustive()
    }
}

impl BearerAuth {
    pub fn new(
        http: Client,
        access_token_uri: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: SecretString,
    ) -> Self {
        Self {
            http,
            access_token_uri: access_token_uri.into(),
            client_id: client_id.into(),
            client_secret,
            metrics: MetricsCollector::new(),
        }
    }

    pub fn with_metrics(mut self, metrics: MetricsCollector) -> Self {
        self.metrics = metrics;
        self
    }

    /// Fetch an access token, logging and swallowing any failure.
    pub async fn access_token(&self) -> Option<SecretString> {
        let result = fetch_access_token(
            &self.http,
            &self.access_token_uri,
            &self.client_id,
            &self.client_secret,
        )
        .await;
        self.metrics.record_access_token_request(result.is_ok());

        match result {
            Ok(token) => Some(token),
            Err(e) => {
                warn!(
                    uri = %self.access_token_uri,
                    error = %e,
                    "Failed to obtain OAuth access token, continuing without bearer token"
                );
                None
            }
        }
    }
}

#[async_trait]
impl AuthHeaders for BearerAuth {
    fn name(&self) -> &'static str {
        "bearer"
    }

    async fn attach(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.access_token().await {
            Some(token) => builder.bearer_auth(token.expose_secret()),
            None => builder,
        }
    }
}

/// HTTP basic authentication.
pub struct BasicAuth {
    username: String,
    password: Option<SecretString>,
}

impl fmt::Debug for BasicAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicAuth")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl BasicAuth {
    pub fn new(username: impl Into<String>, password: Option<SecretString>) -> Self {
        Self {
            username: username.into(),
            password,
        }
    }
}

#[async_trait]
impl AuthHeaders for BasicAuth {
    fn name(&self) -> &'static str {
        "basic"
    }

    async fn attach(&self, builder: RequestBuilder) -> RequestBuilder {
        builder.basic_auth(
            &self.username,
            self.password.as_ref().map(|p| p.expose_secret()),
        )
    }
}

/// Static Vault token sent as `X-Config-Token`; arms the renewal schedule on first use.
pub struct StaticTokenAuth {
    token: SecretString,
    scheduler: Arc<TokenRenewalScheduler>,
}

impl fmt::Debug for StaticTokenAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticTokenAuth")
            .field("token", &redact_token(self.token.expose_secret()))
            .field("scheduler", &self.scheduler)
            .finish()
    }
}

impl StaticTokenAuth {
    pub fn new(token: SecretString, scheduler: Arc<TokenRenewalScheduler>) -> Self {
        Self { token, scheduler }
    }

    pub fn scheduler(&self) -> &Arc<TokenRenewalScheduler> {
        &self.scheduler
    }
}

#[async_trait]
impl AuthHeaders for StaticTokenAuth {
    fn name(&self) -> &'static str {
        "token"
    }

    async fn attach(&self, builder: RequestBuilder) -> RequestBuilder {
        let token = self.token.expose_secret();
        if token.is_empty() {
            return builder;
        }
        self.scheduler.arm();
        builder.header(CONFIG_TOKEN_HEADER, token)
    }
}

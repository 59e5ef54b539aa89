//! Vault token renew-self endpoint.
//!
//! Invariants:
//! - The renew URI never contains a double slash after the base URI.
//! - The requested increment is the TTL in whole seconds.

use reqwest::{Client, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

use crate::error::Result;

/// Path appended to the server base URI for token renewal.
pub const VAULT_RENEW_PATH: &str = "vault/v1/auth/token/renew-self";

/// Header carrying the Vault token on renewal requests.
pub const VAULT_TOKEN_HEADER: &str = "X-Vault-Token";

/// JSON body of a renew-self request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RenewSelfRequest {
    /// Requested lifetime extension in seconds.
    pub increment: u64,
}

impl RenewSelfRequest {
    pub fn from_ttl_ms(ttl_ms: u64) -> Self {
        Self {
            increment: ttl_ms / 1000,
        }
    }
}

/// `<base>/vault/v1/auth/token/renew-self`, tolerating a trailing slash on `base`.
pub fn vault_renew_uri(base_uri: &str) -> String {
    format!("{}/{VAULT_RENEW_PATH}", base_uri.trim_end_matches('/'))
}

/// Build the renew-self POST without sending it.
pub fn renew_self_request(
    client: &Client,
    renew_uri: &str,
    token: &SecretString,
    ttl_ms: u64,
) -> RequestBuilder {
    client
        .post(renew_uri)
        .header(VAULT_TOKEN_HEADER, token.expose_secret())
        .json(&RenewSelfRequest::from_ttl_ms(ttl_ms))
}

/// Send a prepared renew-self request and return the response status.
pub async fn renew_self(builder: RequestBuilder) -> Result<StatusCode> {
    let response = builder.send().await?;
    Ok(response.status())
}

//! OAuth2 client-credentials token endpoint.

use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::debug;

use crate::error::{ClientError, Result};

/// The part of a token response the client uses.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

/// Exchange client credentials for an access token.
///
/// Sends `grant_type=client_credentials` with HTTP Basic auth of
/// `client_id`/`client_secret`.
pub async fn fetch_access_token(
    client: &Client,
    access_token_uri: &str,
    client_id: &str,
    client_secret: &SecretString,
) -> Result<SecretString> {
    debug!(uri = %access_token_uri, client_id = %client_id, "Requesting OAuth access token");

    let response = client
        .post(access_token_uri)
        .basic_auth(client_id, Some(client_secret.expose_secret()))
        .form(&[("grant_type", "client_credentials")])
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        return Err(ClientError::ApiError {
            status: status.as_u16(),
            url: access_token_uri.to_string(),
            message,
        });
    }

    let body: TokenResponse = response
        .json()
        .await
        .map_err(|e| ClientError::InvalidResponse(e.to_string()))?;

    body.access_token
        .filter(|token| !token.is_empty())
        .map(|token| SecretString::new(token.into()))
        .ok_or_else(|| ClientError::InvalidResponse("Missing access_token in response".to_string()))
}

//! Per-client HTTP transport.
//!
//! # Invariants
//! - Every client gets its own `reqwest::Client`; nothing touches process-wide TLS state.
//! - Certificate validation is only relaxed for HTTPS base URIs; HTTP URIs log a warning.

use std::time::Duration;

use cfgserver_config::ClientSettings;

use crate::error::Result;

/// Normalize a base URI by removing trailing slashes.
///
/// - `"https://localhost:8888/"` -> `"https://localhost:8888"`
/// - `"https://example.com:8888//"` -> `"https://example.com:8888"`
pub fn normalize_base_uri(uri: &str) -> String {
    uri.trim_end_matches('/').to_string()
}

/// Build the HTTP client used for every request made on behalf of `settings`.
pub fn build_http_client(settings: &ClientSettings) -> Result<reqwest::Client> {
    build_http_client_with(
        settings.timeout(),
        settings.validate_certificates,
        settings.raw_uri().as_deref(),
    )
}

pub(crate) fn build_http_client_with(
    timeout: Duration,
    validate_certificates: bool,
    base_uri: Option<&str>,
) -> Result<reqwest::Client> {
    let mut http_builder = reqwest::Client::builder().timeout(timeout);

    if !validate_certificates {
        let is_https = base_uri.is_some_and(|uri| uri.starts_with("https://"));
        if is_https {
            http_builder = http_builder.danger_accept_invalid_certs(true);
        } else {
            tracing::warn!(
                "validate_certificates=false has no effect on HTTP URLs. TLS verification only applies to HTTPS connections."
            );
        }
    }

    Ok(http_builder.build()?)
}

//! Common test utilities for integration tests.
//!
//! # What this does NOT handle
//! - Mock server setup (use wiremock directly in tests)
//! - Test-specific assertions or test logic

use std::time::Duration;

use cfgserver_config::ClientSettings;
use secrecy::SecretString;

// Re-export commonly used types for test convenience
#[allow(unused_imports)]
pub use reqwest::Client;
#[allow(unused_imports)]
pub use wiremock::matchers::{body_json, body_string, header, method, path};
#[allow(unused_imports)]
pub use wiremock::{Mock, MockServer, ResponseTemplate};

/// Path of the Vault renew-self endpoint on a mock server.
#[allow(dead_code)]
pub const RENEW_PATH: &str = "/vault/v1/auth/token/renew-self";

#[allow(dead_code)]
pub fn secret(value: &str) -> SecretString {
    SecretString::new(value.into())
}

/// Settings pointing at `server` for application `orders` in `dev`.
#[allow(dead_code)]
pub fn settings_for(server: &MockServer) -> ClientSettings {
    ClientSettings {
        uri: Some(server.uri()),
        name: Some("orders".to_string()),
        environment: "dev".to_string(),
        ..Default::default()
    }
}

/// Mount a client-credentials token endpoint that hands out `token`.
#[allow(dead_code)]
pub async fn mount_token_endpoint(server: &MockServer, token: &str) {
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": token,
            "token_type": "bearer",
            "expires_in": 3600
        })))
        .mount(server)
        .await;
}

/// Number of requests `server` received on `request_path`.
#[allow(dead_code)]
pub async fn request_count(server: &MockServer, request_path: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.url.path() == request_path)
        .count()
}

/// Wait until `server` has seen at least `min` requests on `request_path`.
#[allow(dead_code)]
pub async fn wait_for_requests(
    server: &MockServer,
    request_path: &str,
    min: usize,
    timeout: Duration,
) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if request_count(server, request_path).await >= min {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

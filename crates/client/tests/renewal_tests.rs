//! Vault token renewal against a mock Config Server.

mod common;

use std::sync::Arc;
use std::time::Duration;

use cfgserver_client::{
    BearerAuth, ConfigServerClient, MetricsCollector, RenewalOutcome, VaultTokenRenewer,
};
use common::*;

fn renewer(base_uri: &str, ttl_ms: u64) -> VaultTokenRenewer {
    VaultTokenRenewer::new(
        Client::new(),
        base_uri,
        secret("hvs.renew-me-token"),
        ttl_ms,
    )
    .with_metrics(MetricsCollector::disabled())
}

#[tokio::test]
async fn test_renew_posts_increment_and_token_header() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(RENEW_PATH))
        .and(header("X-Vault-Token", "hvs.renew-me-token"))
        .and(body_json(serde_json::json!({ "increment": 120 })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = renewer(&server.uri(), 120_000).renew_once().await;
    assert_eq!(outcome, RenewalOutcome::Renewed);
}

#[tokio::test]
async fn test_renew_with_trailing_slash_base_uri() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(RENEW_PATH))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let renewer = renewer(&format!("{}/", server.uri()), 300_000);
    assert_eq!(
        renewer.renew_uri(),
        format!("{}{}", server.uri(), RENEW_PATH)
    );
    assert_eq!(renewer.renew_once().await, RenewalOutcome::Renewed);
}

#[tokio::test]
async fn test_renew_rejected_status_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(RENEW_PATH))
        .respond_with(ResponseTemplate::new(403).set_body_string("permission denied"))
        .mount(&server)
        .await;

    let outcome = renewer(&server.uri(), 300_000).renew_once().await;
    assert_eq!(outcome, RenewalOutcome::Rejected(403));
}

#[tokio::test]
async fn test_renew_transport_failure_is_reported() {
    // Nothing listens on port 1.
    let outcome = renewer("http://127.0.0.1:1", 300_000).renew_once().await;
    assert_eq!(outcome, RenewalOutcome::Failed);
}

#[tokio::test]
async fn test_renew_carries_bearer_token() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server, "oauth-access").await;
    Mock::given(method("POST"))
        .and(path(RENEW_PATH))
        .and(header("Authorization", "Bearer oauth-access"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let bearer = BearerAuth::new(
        Client::new(),
        format!("{}/oauth/token", server.uri()),
        "client",
        secret("client-secret"),
    )
    .with_metrics(MetricsCollector::disabled());
    let renewer = renewer(&server.uri(), 300_000).with_bearer(Arc::new(bearer));

    assert_eq!(renewer.renew_once().await, RenewalOutcome::Renewed);
}

#[tokio::test]
async fn test_schedule_keeps_firing_after_failures() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(RENEW_PATH))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = ConfigServerClient::builder(cfgserver_config::ClientSettings {
        token: Some(secret("hvs.schedule-token")),
        token_renew_rate_ms: 50,
        ..settings_for(&server)
    })
    .metrics(MetricsCollector::disabled())
    .build()
    .unwrap();

    assert!(client.start_renewal());
    let fired = wait_for_requests(&server, RENEW_PATH, 3, Duration::from_secs(5)).await;
    assert!(
        fired,
        "renewal schedule stopped firing after a failed renewal"
    );

    client.stop_renewal();
    let scheduler = client.renewal_scheduler().unwrap();
    assert!(scheduler.is_stopped());
    assert!(!client.start_renewal());
}

#[tokio::test]
async fn test_stopped_schedule_sends_nothing_more() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(RENEW_PATH))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let client = ConfigServerClient::builder(cfgserver_config::ClientSettings {
        token: Some(secret("hvs.schedule-token")),
        token_renew_rate_ms: 50,
        ..settings_for(&server)
    })
    .metrics(MetricsCollector::disabled())
    .build()
    .unwrap();

    assert!(client.start_renewal());
    assert!(wait_for_requests(&server, RENEW_PATH, 1, Duration::from_secs(5)).await);

    drop(client);
    // Let any request already on the wire land before taking the baseline.
    tokio::time::sleep(Duration::from_millis(100)).await;
    let baseline = request_count(&server, RENEW_PATH).await;
    tokio::time::sleep(Duration::from_millis(250)).await;
    assert_eq!(request_count(&server, RENEW_PATH).await, baseline);
}

//! Cloud Foundry `VCAP_*` source.
//!
//! Responsibilities:
//! - Flatten `VCAP_APPLICATION` under `vcap:application`.
//! - Flatten `VCAP_SERVICES` under `vcap:services`, so a bound config server
//!   appears at `vcap:services:<service>:0:credentials:*`.
//!
//! Invariants:
//! - Absent or blank variables contribute nothing.
//! - Malformed JSON is an error naming the variable.

use std::collections::BTreeMap;

use super::env::env_var_or_none;
use super::flatten_json;
use crate::constants::{VCAP_APPLICATION_ROOT, VCAP_SERVICES_ROOT};
use crate::error::ConfigError;

pub const VCAP_APPLICATION_VAR: &str = "VCAP_APPLICATION";
pub const VCAP_SERVICES_VAR: &str = "VCAP_SERVICES";

/// Read and flatten both `VCAP_*` variables from the process environment.
pub fn cloud_foundry_entries() -> Result<BTreeMap<String, String>, ConfigError> {
    cloud_foundry_entries_from(
        env_var_or_none(VCAP_APPLICATION_VAR).as_deref(),
        env_var_or_none(VCAP_SERVICES_VAR).as_deref(),
    )
}

/// Flatten already-read `VCAP_APPLICATION` / `VCAP_SERVICES` payloads.
pub fn cloud_foundry_entries_from(
    application: Option<&str>,
    services: Option<&str>,
) -> Result<BTreeMap<String, String>, ConfigError> {
    let mut entries = BTreeMap::new();
    for (var, root, payload) in [
        (VCAP_APPLICATION_VAR, VCAP_APPLICATION_ROOT, application),
        (VCAP_SERVICES_VAR, VCAP_SERVICES_ROOT, services),
    ] {
        let Some(payload) = payload.filter(|p| !p.trim().is_empty()) else {
            continue;
        };
        let document: serde_json::Value =
            serde_json::from_str(payload).map_err(|e| ConfigError::InvalidEnvJson {
                var: var.to_string(),
                message: e.to_string(),
            })?;
        flatten_json(root, &document, &mut entries);
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const SERVICES: &str = r#"{
        "p-config-server": [{
            "name": "config-server",
            "credentials": {
                "uri": "https://config.cf.example.com",
                "client_id": "cf-client",
                "client_secret": "cf-secret",
                "access_token_uri": "https://uaa.cf.example.com/oauth/token"
            }
        }]
    }"#;

    #[test]
    fn test_services_flattened_under_vcap_services() {
        let entries = cloud_foundry_entries_from(None, Some(SERVICES)).unwrap();
        assert_eq!(
            entries
                .get("vcap:services:p-config-server:0:credentials:uri")
                .map(String::as_str),
            Some("https://config.cf.example.com")
        );
        assert_eq!(
            entries
                .get("vcap:services:p-config-server:0:name")
                .map(String::as_str),
            Some("config-server")
        );
    }

    #[test]
    fn test_application_flattened_under_vcap_application() {
        let application = r#"{"application_name":"orders","limits":{"mem":512}}"#;
        let entries = cloud_foundry_entries_from(Some(application), None).unwrap();
        assert_eq!(
            entries
                .get("vcap:application:application_name")
                .map(String::as_str),
            Some("orders")
        );
        assert_eq!(
            entries.get("vcap:application:limits:mem").map(String::as_str),
            Some("512")
        );
    }

    #[test]
    fn test_absent_variables_contribute_nothing() {
        let entries = cloud_foundry_entries_from(None, Some("  ")).unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn test_malformed_json_names_variable() {
        let err = cloud_foundry_entries_from(None, Some("{oops")).unwrap_err();
        match err {
            ConfigError::InvalidEnvJson { var, .. } => assert_eq!(var, "VCAP_SERVICES"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    #[serial]
    fn test_reads_process_environment() {
        temp_env::with_vars(
            [
                (VCAP_SERVICES_VAR, Some(SERVICES)),
                (VCAP_APPLICATION_VAR, None),
            ],
            || {
                let entries = cloud_foundry_entries().unwrap();
                assert_eq!(
                    entries
                        .get("vcap:services:p-config-server:0:credentials:client_id")
                        .map(String::as_str),
                    Some("cf-client")
                );
            },
        );
    }
}

//! Settings resolution from a layered configuration tree.
//!
//! Responsibilities:
//! - Read base client settings from the client section (`cloud:config` by default).
//! - Apply Cloud Foundry service-binding credentials over section values.
//! - Substitute `${...}` placeholders in every resolved string.
//! - Push the effective settings back into the tree as the `config-server-settings` layer.
//!
//! Does NOT handle:
//! - Reading configuration sources (see `loader`).
//! - Any network access (see the client crate).
//!
//! Invariants:
//! - Precedence per setting: service binding, then client section, then the value
//!   already held by the passed settings.
//! - Malformed or non-positive optional values are treated as absent and never error.
//! - A missing server URI after resolution is the only resolution error.

use secrecy::SecretString;
use std::str::FromStr;
use tracing::{debug, warn};

use crate::constants::{
    DEFAULT_CONFIG_PREFIX, DEFAULT_CONFIG_SERVER_SERVICE, DEFAULT_VAULT_TOKEN_RENEW_RATE_MS,
    DEFAULT_VAULT_TOKEN_TTL_MS, SETTINGS_LAYER_NAME, SPRING_APPLICATION_NAME_KEY,
    VCAP_SERVICES_ROOT,
};
use crate::error::ConfigError;
use crate::placeholder::resolve_placeholders;
use crate::tree::{ConfigurationTree, Section, join_key};
use crate::types::ClientSettings;

/// Resolves [`ClientSettings`] from a [`ConfigurationTree`].
#[derive(Debug, Clone)]
pub struct SettingsResolver {
    prefix: String,
    service_name: String,
}

impl Default for SettingsResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsResolver {
    /// Resolver reading `cloud:config` and the `p-config-server` binding.
    pub fn new() -> Self {
        Self {
            prefix: DEFAULT_CONFIG_PREFIX.to_string(),
            service_name: DEFAULT_CONFIG_SERVER_SERVICE.to_string(),
        }
    }

    /// Read the client section from `prefix` instead (e.g. `spring:cloud:config`).
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Look for the service binding under a different service name.
    pub fn with_service_name(mut self, service_name: impl Into<String>) -> Self {
        self.service_name = service_name.into();
        self
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    /// Path of the bound service's credentials section.
    pub fn binding_path(&self) -> String {
        join_key(
            VCAP_SERVICES_ROOT,
            &format!("{}:0:credentials", self.service_name),
        )
    }

    /// Resolve `settings` in place and push the write-back layer onto `tree`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingSetting` naming `<prefix>:uri` when no
    /// server URI is available after resolution.
    pub fn resolve(
        &self,
        tree: &mut ConfigurationTree,
        settings: &mut ClientSettings,
    ) -> Result<(), ConfigError> {
        self.apply_base_settings(tree, settings);
        self.apply_cloud_foundry(tree, settings);

        if settings
            .uri
            .as_deref()
            .is_none_or(|uri| uri.trim().is_empty())
        {
            return Err(ConfigError::missing(join_key(&self.prefix, "uri")));
        }

        tree.push_layer(SETTINGS_LAYER_NAME, settings.to_properties(&self.prefix));
        debug!(
            prefix = %self.prefix,
            layer = SETTINGS_LAYER_NAME,
            "Wrote effective client settings back to configuration"
        );
        Ok(())
    }

    /// Resolve starting from default settings.
    pub fn resolve_new(&self, tree: &mut ConfigurationTree) -> Result<ClientSettings, ConfigError> {
        let mut settings = ClientSettings::default();
        self.resolve(tree, &mut settings)?;
        Ok(settings)
    }

    fn apply_base_settings(&self, tree: &ConfigurationTree, settings: &mut ClientSettings) {
        let section = tree.section(&self.prefix);
        let read = |key: &str| resolved(&section, key);

        if let Some(name) = read("name").or_else(|| {
            tree.get(SPRING_APPLICATION_NAME_KEY)
                .filter(|v| !v.is_empty())
                .map(|v| resolve_placeholders(v, tree))
        }) {
            settings.name = Some(name);
        }
        if let Some(env) = read("env") {
            settings.environment = env;
        }
        set_if_some(&mut settings.label, read("label"));
        set_if_some(&mut settings.username, read("username"));
        set_if_some(&mut settings.uri, read("uri"));
        if let Some(password) = read("password") {
            settings.password = Some(SecretString::new(password.into()));
        }
        if let Some(token) = read("token") {
            settings.token = Some(SecretString::new(token.into()));
        }

        parse_into(&mut settings.enabled, read("enabled"), parse_bool);
        parse_into(&mut settings.fail_fast, read("failFast"), parse_bool);
        parse_into(
            &mut settings.validate_certificates,
            read("validate_certificates").or_else(|| read("validateCertificates")),
            parse_bool,
        );
        parse_into(&mut settings.timeout_ms, read("timeout"), parse_number);
        parse_into(
            &mut settings.retry_enabled,
            read("retry:enabled"),
            parse_bool,
        );
        parse_into(
            &mut settings.retry_initial_interval_ms,
            read("retry:initialInterval"),
            parse_number,
        );
        parse_into(
            &mut settings.retry_max_interval_ms,
            read("retry:maxInterval"),
            parse_number,
        );
        parse_into(
            &mut settings.retry_multiplier,
            read("retry:multiplier"),
            parse_multiplier,
        );
        parse_into(
            &mut settings.retry_attempts,
            read("retry:maxAttempts"),
            parse_number,
        );
    }

    fn apply_cloud_foundry(&self, tree: &ConfigurationTree, settings: &mut ClientSettings) {
        let section = tree.section(&self.prefix);
        let binding_path = self.binding_path();
        let binding = tree.section(&binding_path);
        if binding.exists() {
            debug!(binding = %binding_path, "Found config server service binding");
        }

        let pick = |key: &str| resolved(&binding, key).or_else(|| resolved(&section, key));

        set_if_some(&mut settings.uri, pick("uri"));
        set_if_some(&mut settings.access_token_uri, pick("access_token_uri"));
        set_if_some(&mut settings.client_id, pick("client_id"));
        if let Some(secret) = pick("client_secret") {
            settings.client_secret = Some(SecretString::new(secret.into()));
        }

        settings.token_ttl_ms = positive_ms(
            resolved(&section, "tokenTtl"),
            settings.token_ttl_ms,
            DEFAULT_VAULT_TOKEN_TTL_MS,
            &join_key(&self.prefix, "tokenTtl"),
        );
        settings.token_renew_rate_ms = positive_ms(
            resolved(&section, "tokenRenewRate"),
            settings.token_renew_rate_ms,
            DEFAULT_VAULT_TOKEN_RENEW_RATE_MS,
            &join_key(&self.prefix, "tokenRenewRate"),
        );
    }
}

/// Non-empty value of `key` under `section`, placeholders substituted.
fn resolved(section: &Section<'_>, key: &str) -> Option<String> {
    section
        .get_non_empty(key)
        .map(|value| resolve_placeholders(value, section.tree()))
}

fn set_if_some<T>(target: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *target = value;
    }
}

fn parse_into<T>(target: &mut T, raw: Option<String>, parse: fn(&str) -> Option<T>) {
    if let Some(value) = raw.as_deref().and_then(parse) {
        *target = value;
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

fn parse_number<T: FromStr>(raw: &str) -> Option<T> {
    raw.trim().parse().ok()
}

fn parse_multiplier(raw: &str) -> Option<f64> {
    parse_number::<f64>(raw).filter(|m| m.is_finite() && *m > 0.0)
}

/// Parse a millisecond interval that must be positive.
///
/// Unparsable or non-positive input keeps `current`; a non-positive `current`
/// becomes `default`.
fn positive_ms(raw: Option<String>, current: u64, default: u64, key: &str) -> u64 {
    let current = if current == 0 { default } else { current };
    let Some(raw) = raw else {
        return current;
    };
    match raw.trim().parse::<i64>() {
        Ok(value) if value > 0 => value.unsigned_abs(),
        _ => {
            warn!(
                key = %key,
                value = %raw,
                fallback = current,
                "Ignoring invalid interval setting"
            );
            current
        }
    }
}

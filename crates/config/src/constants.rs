//! Centralized constants for the Config Server client workspace.
//!
//! This module contains default values and well-known configuration keys used
//! across crates to avoid magic value duplication.

// =============================================================================
// Configuration Keys
// =============================================================================

/// Default configuration section read by the settings resolver.
pub const DEFAULT_CONFIG_PREFIX: &str = "cloud:config";

/// Root under which Cloud Foundry's `VCAP_SERVICES` is flattened.
pub const VCAP_SERVICES_ROOT: &str = "vcap:services";

/// Root under which Cloud Foundry's `VCAP_APPLICATION` is flattened.
pub const VCAP_APPLICATION_ROOT: &str = "vcap:application";

/// Default service label of a bound Config Server instance.
pub const DEFAULT_CONFIG_SERVER_SERVICE: &str = "p-config-server";

/// Fallback key for the application name when the client section has none.
pub const SPRING_APPLICATION_NAME_KEY: &str = "spring:application:name";

/// Name of the layer the resolver pushes with the effective settings.
pub const SETTINGS_LAYER_NAME: &str = "config-server-settings";

// =============================================================================
// Client Defaults
// =============================================================================

/// Default environment (profile) requested from the Config Server.
pub const DEFAULT_ENVIRONMENT: &str = "Production";

/// Default Vault token time-to-live in milliseconds (5 minutes).
pub const DEFAULT_VAULT_TOKEN_TTL_MS: u64 = 300_000;

/// Default Vault token renew rate in milliseconds (1 minute).
pub const DEFAULT_VAULT_TOKEN_RENEW_RATE_MS: u64 = 60_000;

/// Default HTTP request timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 6_000;

/// Whether server certificates are validated by default.
pub const DEFAULT_CERTIFICATE_VALIDATION: bool = true;

/// Whether the provider is enabled by default.
pub const DEFAULT_PROVIDER_ENABLED: bool = true;

/// Whether startup fails when the server is unreachable.
pub const DEFAULT_FAIL_FAST: bool = false;

// =============================================================================
// Retry Defaults
// =============================================================================

/// Whether retries are enabled by default.
pub const DEFAULT_RETRY_ENABLED: bool = false;

/// Initial retry interval in milliseconds.
pub const DEFAULT_INITIAL_RETRY_INTERVAL_MS: u64 = 1_000;

/// Maximum retry interval in milliseconds.
pub const DEFAULT_MAX_RETRY_INTERVAL_MS: u64 = 2_000;

/// Multiplier applied to the retry interval after each attempt.
pub const DEFAULT_RETRY_MULTIPLIER: f64 = 1.1;

/// Maximum number of retry attempts.
pub const DEFAULT_MAX_RETRY_ATTEMPTS: u32 = 6;

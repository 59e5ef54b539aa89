//! Configuration loader builder implementation.
//!
//! Responsibilities:
//! - Provide a builder-pattern `ConfigLoader` that stacks configuration sources
//!   into a `ConfigurationTree`, one layer per source.
//! - Run the settings resolver over the stacked sources (`add_config_server`).
//!
//! Does NOT handle:
//! - Parsing individual sources (delegated to `sources`).
//! - Settings precedence rules (delegated to `resolver.rs`).
//!
//! Invariants / Assumptions:
//! - Sources added later take precedence over sources added earlier.
//! - `load_dotenv()` must be called explicitly to enable `.env` file loading.
//! - The `DOTENV_DISABLED` variable is checked before `dotenvy::dotenv()` is called.
//! - The Cloud Foundry source is added at most once.

use std::path::Path;
use tracing::debug;

use crate::constants::DEFAULT_ENVIRONMENT;
use crate::error::ConfigError;
use crate::resolver::SettingsResolver;
use crate::sources::cloud_foundry::cloud_foundry_entries;
use crate::sources::env::environment_entries;
use crate::sources::file::{FileFormat, load_file};
use crate::tree::ConfigurationTree;
use crate::types::ClientSettings;

/// Layer name used for the Cloud Foundry source.
pub const CLOUD_FOUNDRY_LAYER: &str = "cloud-foundry";

/// Layer name used for environment variables.
pub const ENVIRONMENT_LAYER: &str = "environment";

/// Options for [`ConfigLoader::add_config_server`].
#[derive(Debug, Clone, Default)]
pub struct ConfigServerOptions {
    /// Resolver to run; defaults to `cloud:config` and `p-config-server`.
    pub resolver: SettingsResolver,
    /// Environment used unless configuration names one. Defaults to `Production`.
    pub environment: Option<String>,
    /// Application name used unless configuration names one. Defaults to the
    /// executable's file stem.
    pub application_name: Option<String>,
}

/// Result of [`ConfigLoader::add_config_server`].
#[derive(Debug, Clone)]
pub struct ConfigServerSetup {
    /// All sources plus the `config-server-settings` write-back layer.
    pub tree: ConfigurationTree,
    pub settings: ClientSettings,
}

/// Configuration loader that stacks sources into a [`ConfigurationTree`].
#[derive(Debug, Default)]
pub struct ConfigLoader {
    tree: ConfigurationTree,
}

impl ConfigLoader {
    /// Create a loader with no sources.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if dotenv loading is disabled via environment variable.
    fn dotenv_disabled() -> bool {
        matches!(
            std::env::var("DOTENV_DISABLED").ok().as_deref(),
            Some("true") | Some("1")
        )
    }

    /// Load environment variables from .env file if present.
    ///
    /// If `DOTENV_DISABLED` environment variable is set to "true" or "1",
    /// the .env file will not be loaded (useful for testing).
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The `.env` file exists but has invalid syntax (`ConfigError::DotenvParse`)
    /// - The `.env` file exists but cannot be read due to I/O errors (`ConfigError::DotenvIo`)
    ///
    /// Missing `.env` files are silently ignored (returns `Ok(self)`).
    ///
    /// SAFETY: Error messages never include raw .env line contents to prevent secret leakage.
    pub fn load_dotenv(self) -> Result<Self, ConfigError> {
        if Self::dotenv_disabled() {
            return Ok(self);
        }

        match dotenvy::dotenv() {
            Ok(path) => {
                debug!(path = %path.display(), "Loaded .env file");
                Ok(self)
            }
            Err(e) if Self::is_not_found(&e) => Ok(self),
            Err(dotenvy::Error::LineParse(_, idx)) => {
                Err(ConfigError::DotenvParse { error_index: idx })
            }
            Err(dotenvy::Error::Io(io_err)) => Err(ConfigError::DotenvIo {
                kind: io_err.kind(),
            }),
            Err(_) => Err(ConfigError::DotenvUnknown),
        }
    }

    /// Check if a dotenv error indicates the file was not found.
    fn is_not_found(err: &dotenvy::Error) -> bool {
        matches!(
            err,
            dotenvy::Error::Io(io_err) if io_err.kind() == std::io::ErrorKind::NotFound
        )
    }

    /// Add an in-memory layer.
    pub fn with_in_memory<I, K, V>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.tree.push_layer("memory", entries);
        self
    }

    /// Add a JSON file layer. A missing `optional` file adds nothing.
    pub fn from_json_file(
        self,
        path: impl AsRef<Path>,
        optional: bool,
    ) -> Result<Self, ConfigError> {
        self.from_file(path.as_ref(), FileFormat::Json, optional)
    }

    /// Add a YAML file layer. A missing `optional` file adds nothing.
    pub fn from_yaml_file(
        self,
        path: impl AsRef<Path>,
        optional: bool,
    ) -> Result<Self, ConfigError> {
        self.from_file(path.as_ref(), FileFormat::Yaml, optional)
    }

    fn from_file(
        mut self,
        path: &Path,
        format: FileFormat,
        optional: bool,
    ) -> Result<Self, ConfigError> {
        if let Some(entries) = load_file(path, format, optional)? {
            let kind = match format {
                FileFormat::Json => "json",
                FileFormat::Yaml => "yaml",
            };
            self.tree
                .push_layer(format!("{kind}:{}", path.display()), entries);
        }
        Ok(self)
    }

    /// Add environment variables, optionally only those starting with `prefix`.
    pub fn from_env(mut self, prefix: Option<&str>) -> Self {
        let entries = environment_entries(prefix);
        debug!(
            prefix = prefix.unwrap_or_default(),
            keys = entries.len(),
            "Loaded environment variables"
        );
        self.tree.push_layer(ENVIRONMENT_LAYER, entries);
        self
    }

    /// Add the Cloud Foundry `VCAP_*` layer unless it is already present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvJson` if either variable holds malformed JSON.
    pub fn from_cloud_foundry(mut self) -> Result<Self, ConfigError> {
        if self.tree.has_layer(CLOUD_FOUNDRY_LAYER) {
            return Ok(self);
        }
        self.tree
            .push_layer(CLOUD_FOUNDRY_LAYER, cloud_foundry_entries()?);
        Ok(self)
    }

    /// Finish without resolving client settings.
    pub fn build(self) -> ConfigurationTree {
        self.tree
    }

    /// Ensure the Cloud Foundry source is present, then resolve client settings
    /// over every layer added so far.
    ///
    /// # Errors
    ///
    /// Returns an error if the Cloud Foundry source is malformed or no server
    /// URI can be resolved.
    pub fn add_config_server(
        self,
        options: ConfigServerOptions,
    ) -> Result<ConfigServerSetup, ConfigError> {
        let mut tree = self.from_cloud_foundry()?.build();

        let mut settings = ClientSettings {
            environment: options
                .environment
                .unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string()),
            name: options.application_name.or_else(executable_stem),
            ..ClientSettings::default()
        };
        options.resolver.resolve(&mut tree, &mut settings)?;

        debug!(
            name = settings.name.as_deref().unwrap_or_default(),
            environment = %settings.environment,
            layers = ?tree.layer_names().collect::<Vec<_>>(),
            "Resolved config server client settings"
        );
        Ok(ConfigServerSetup { tree, settings })
    }
}

fn executable_stem() -> Option<String> {
    std::env::current_exe()
        .ok()?
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
}

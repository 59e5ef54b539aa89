//! Settings resolution for command execution.
//!
//! Responsibilities:
//! - Layer configuration files and environment variables in CLI order.
//! - Resolve client settings (including any Cloud Foundry binding).
//!
//! Does NOT handle:
//! - `.env` loading (done in `main()` before argument parsing).
//! - CLI argument definitions (see `args` module).
//!
//! Invariants:
//! - Layer order is JSON file, YAML file, environment, Cloud Foundry (last wins).

use anyhow::{Context, Result};
use cfgserver_client::ConfigServerClient;
use cfgserver_config::{ConfigLoader, ConfigServerOptions, ConfigServerSetup, SettingsResolver};

use crate::args::Cli;

/// Resolved settings plus the configuration prefix they were read from.
pub(crate) struct ConfigContext {
    pub(crate) setup: ConfigServerSetup,
    pub(crate) prefix: String,
}

impl ConfigContext {
    pub(crate) fn load(cli: &Cli) -> Result<Self> {
        let mut loader = ConfigLoader::new();
        if let Some(ref path) = cli.json_file {
            loader = loader
                .from_json_file(path, false)
                .with_context(|| format!("Failed to load {}", path.display()))?;
        }
        if let Some(ref path) = cli.yaml_file {
            loader = loader
                .from_yaml_file(path, false)
                .with_context(|| format!("Failed to load {}", path.display()))?;
        }
        loader = loader.from_env(cli.env_prefix.as_deref());

        let options = ConfigServerOptions {
            resolver: SettingsResolver::new()
                .with_prefix(cli.prefix.clone())
                .with_service_name(cli.service_name.clone()),
            environment: cli.environment.clone(),
            application_name: cli.app_name.clone(),
        };
        let setup = loader.add_config_server(options)?;

        Ok(Self {
            setup,
            prefix: cli.prefix.clone(),
        })
    }

    pub(crate) fn build_client(&self) -> Result<ConfigServerClient> {
        Ok(ConfigServerClient::builder(self.setup.settings.clone())
            .config_prefix(self.prefix.clone())
            .build()?)
    }
}

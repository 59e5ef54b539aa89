//! Configuration loader for `.env`, environment variables, files, and Cloud Foundry.
//!
//! Responsibilities:
//! - Provide a builder-pattern `ConfigLoader` that layers sources into a `ConfigurationTree`.
//! - Enforce `DOTENV_DISABLED` gate to prevent accidental dotenv loading in tests.
//! - Resolve client settings over the loaded layers.
//!
//! Does NOT handle:
//! - Fetching configuration from the Config Server itself.
//!
//! Invariants / Assumptions:
//! - Later sources take precedence over earlier ones.
//! - `load_dotenv()` must be called explicitly to enable `.env` file loading.

mod builder;

pub use builder::{
    CLOUD_FOUNDRY_LAYER, ConfigLoader, ConfigServerOptions, ConfigServerSetup, ENVIRONMENT_LAYER,
};

#[cfg(test)]
mod tests;

//! Configuration management for the Config Server client.
//!
//! This crate layers configuration sources (files, environment variables,
//! Cloud Foundry service bindings) into a [`ConfigurationTree`] and resolves
//! the [`ClientSettings`] the client crate consumes.

pub mod constants;
pub mod error;
mod loader;
pub mod placeholder;
pub mod resolver;
pub mod sources;
pub mod tree;
pub mod types;

pub use error::ConfigError;
pub use loader::{
    CLOUD_FOUNDRY_LAYER, ConfigLoader, ConfigServerOptions, ConfigServerSetup, ENVIRONMENT_LAYER,
};
pub use placeholder::resolve_placeholders;
pub use resolver::SettingsResolver;
pub use tree::{ConfigurationTree, Section};
pub use types::{ClientSettings, URI_SEPARATOR};

#[cfg(test)]
pub(crate) mod test_util {
    use std::sync::{Mutex, OnceLock};

    pub fn global_test_lock() -> &'static Mutex<()> {
        static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        LOCK.get_or_init(|| Mutex::new(()))
    }
}

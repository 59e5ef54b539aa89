//! CLI command implementations.

pub mod renew;
pub mod request;
pub mod settings;

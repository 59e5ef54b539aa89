//! Error types for configuration loading and settings resolution.
//!
//! Responsibilities:
//! - Define error variants for setup-time configuration failures.
//!
//! Does NOT handle:
//! - Optional settings that fail to parse. Those fall back to defaults and
//!   never surface as errors (see `resolver.rs`).
//!
//! Invariants:
//! - Every variant names the offending key, variable, or path.
//! - Dotenv errors NEVER include raw .env line contents to prevent secret leakage.

use std::io::ErrorKind;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while building configuration or resolving settings.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required setting: {key}")]
    MissingSetting { key: String },

    #[error("Failed to read config file at {path}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {message}")]
    FileParse { path: PathBuf, message: String },

    #[error("Environment variable {var} does not contain valid JSON: {message}")]
    InvalidEnvJson { var: String, message: String },

    /// Failed to parse the `.env` file due to invalid syntax.
    ///
    /// SAFETY: This error only includes the byte index of the parse failure,
    /// NOT the offending line content, to prevent leaking secrets.
    #[error(
        "Failed to parse .env file at position {error_index}. Hint: set DOTENV_DISABLED=1 to skip .env loading"
    )]
    DotenvParse { error_index: usize },

    /// Failed to read the `.env` file due to an I/O error.
    #[error("Failed to read .env file: {kind}")]
    DotenvIo { kind: ErrorKind },

    #[error("Failed to load .env file. Hint: set DOTENV_DISABLED=1 to skip .env loading")]
    DotenvUnknown,
}

impl ConfigError {
    pub(crate) fn missing(key: impl Into<String>) -> Self {
        Self::MissingSetting { key: key.into() }
    }
}

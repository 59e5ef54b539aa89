//! Error types for the Config Server client.
//!
//! Renewal and OAuth failures are logged where they happen and never reach
//! callers; the variants here cover setup and the requests callers drive.

use thiserror::Error;

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur during Config Server client operations.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Settings are unusable (e.g. missing server URI).
    #[error(transparent)]
    Config(#[from] cfgserver_config::ConfigError),

    /// HTTP request error.
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Invalid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Non-success response from the server.
    #[error("API error ({status}) at {url}: {message}")]
    ApiError {
        status: u16,
        url: String,
        message: String,
    },

    /// Response body did not have the expected shape.
    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_is_transparent() {
        let err: ClientError = cfgserver_config::ConfigError::MissingSetting {
            key: "cloud:config:uri".to_string(),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "Missing required setting: cloud:config:uri"
        );
    }
}

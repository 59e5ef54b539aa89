//! HTTP endpoint implementations.
//!
//! Each function performs (or describes) exactly one HTTP exchange and returns
//! a typed result; logging of failures and policy decisions live in the callers.

mod config_server;
mod oauth;
mod vault;

pub use config_server::{LABEL_SLASH_ESCAPE, config_server_uri};
pub use oauth::{TokenResponse, fetch_access_token};
pub use vault::{
    RenewSelfRequest, VAULT_RENEW_PATH, VAULT_TOKEN_HEADER, renew_self, renew_self_request,
    vault_renew_uri,
};

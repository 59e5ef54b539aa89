//! Shared test utilities for cfgserver integration tests.
//!
//! Responsibilities:
//! - Provide a hermetic CLI command factory that prevents dotenv loading and
//!   host environment leakage.
//!
//! Invariants / Assumptions:
//! - The child process starts from an empty environment plus `DOTENV_DISABLED=1`.

use assert_cmd::Command;

/// Returns a hermetic `cfgserver` command for integration testing.
pub fn cfgserver_cmd() -> Command {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("cfgserver");

    // Every environment variable is a configuration source; start clean.
    cmd.env_clear();

    // Hermeticity: prevent loading local .env
    cmd.env("DOTENV_DISABLED", "1");

    cmd
}

/// Returns a hermetic `cfgserver` command pointed at `uri` for application `orders` in `dev`.
#[allow(dead_code)]
pub fn cfgserver_cmd_with_uri(uri: &str) -> Command {
    let mut cmd = cfgserver_cmd();
    cmd.env("CLOUD__CONFIG__URI", uri)
        .args(["--app-name", "orders", "--environment", "dev"]);
    cmd
}

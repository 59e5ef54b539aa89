//! CLI argument definitions and parsing.
//!
//! Responsibilities:
//! - Define the CLI structure using clap derive macros.
//! - Parse command-line arguments and environment variables.
//!
//! Non-responsibilities:
//! - Does not execute commands (see `dispatch` module).
//! - Does not resolve settings (see `config_context` module).

use cfgserver_config::constants::{DEFAULT_CONFIG_PREFIX, DEFAULT_CONFIG_SERVER_SERVICE};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cfgserver")]
#[command(
    about = "Resolve Spring Cloud Config Server client settings and exercise the client",
    long_about = None
)]
#[command(version)]
#[command(
    after_help = "Examples:\n  cfgserver settings\n  cfgserver --yaml-file appsettings.yaml settings --output json\n  cfgserver request --label main --send\n  cfgserver renew --once\n  CFGSERVER_CLOUD__CONFIG__TOKEN=... cfgserver --env-prefix CFGSERVER_ renew\n"
)]
pub struct Cli {
    /// JSON configuration file layered below environment variables
    #[arg(long, global = true, env = "CFGSERVER_JSON_FILE", value_name = "FILE")]
    pub json_file: Option<PathBuf>,

    /// YAML configuration file layered below environment variables
    #[arg(long, global = true, env = "CFGSERVER_YAML_FILE", value_name = "FILE")]
    pub yaml_file: Option<PathBuf>,

    /// Only read environment variables with this prefix (stripped from keys)
    #[arg(long, global = true, env = "CFGSERVER_ENV_PREFIX")]
    pub env_prefix: Option<String>,

    /// Configuration section holding client settings
    #[arg(long, global = true, env = "CFGSERVER_PREFIX", default_value = DEFAULT_CONFIG_PREFIX)]
    pub prefix: String,

    /// Cloud Foundry service binding to read credentials from
    #[arg(
        long,
        global = true,
        env = "CFGSERVER_SERVICE_NAME",
        default_value = DEFAULT_CONFIG_SERVER_SERVICE
    )]
    pub service_name: String,

    /// Application name (defaults to spring:application:name, then the executable name)
    #[arg(long, global = true)]
    pub app_name: Option<String>,

    /// Environment (profile) to request
    #[arg(long, global = true)]
    pub environment: Option<String>,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value_t = LogFormatArg::Text)]
    pub log_format: LogFormatArg,

    /// OTLP collector endpoint for trace export (e.g. http://localhost:4317)
    #[arg(long, global = true, env = "CFGSERVER_OTLP_ENDPOINT")]
    pub otlp_endpoint: Option<String>,

    /// Serve Prometheus metrics on this address (e.g. 127.0.0.1:9090)
    #[arg(
        long,
        global = true,
        env = "CFGSERVER_METRICS_BIND",
        value_name = "ADDR"
    )]
    pub metrics_bind: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    Text,
    Json,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormatArg {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the resolved client settings with secrets redacted
    Settings {
        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormatArg::Text)]
        output: OutputFormatArg,
    },

    /// Build the Config Server request and print it, optionally sending it
    Request {
        /// Label (branch) overriding the configured one
        #[arg(short, long)]
        label: Option<String>,

        /// Send the request and print the response body
        #[arg(long)]
        send: bool,
    },

    /// Renew the configured Vault token
    Renew {
        /// Renew once and exit instead of running the schedule until Ctrl+C
        #[arg(long)]
        once: bool,
    },
}

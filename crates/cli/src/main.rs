//! cfgserver - Spring Cloud Config Server client settings from the command line.
//!
//! Responsibilities:
//! - Parse command-line arguments and environment variables.
//! - Resolve client settings through the shared config library.
//! - Build, print, and send Config Server requests; renew Vault tokens.
//!
//! Does NOT handle:
//! - Settings resolution rules or HTTP behavior (see `crates/config` and `crates/client`).
//!
//! Invariants:
//! - `load_dotenv()` is called BEFORE CLI parsing to allow `.env` to provide clap defaults.
//! - Secrets are redacted in everything this binary prints.

mod args;
mod cancellation;
mod commands;
mod config_context;
mod dispatch;
mod error;
mod formatters;

use args::{Cli, LogFormatArg};
use cancellation::{CancellationToken, is_cancelled_error, print_cancelled_message};
use cfgserver_client::metrics_exporter::MetricsExporter;
use cfgserver_client::tracing::{LogFormat, TracingConfig};
use cfgserver_config::ConfigLoader;
use clap::Parser;
use config_context::ConfigContext;
use dispatch::run_command;
use error::{ExitCode, ExitCodeExt};

#[tokio::main]
async fn main() {
    // Load .env file BEFORE CLI parsing so clap env defaults can read .env values
    if let Err(e) = ConfigLoader::new().load_dotenv() {
        eprintln!("Failed to load environment: {}", e);
        std::process::exit(ExitCode::GeneralError.as_i32());
    }

    let cli = Cli::parse();

    let mut tracing_config = TracingConfig::new()
        .with_service_name("cfgserver")
        .with_log_format(match cli.log_format {
            LogFormatArg::Text => LogFormat::Text,
            LogFormatArg::Json => LogFormat::Json,
        });
    if let Some(ref endpoint) = cli.otlp_endpoint {
        tracing_config = tracing_config.with_otlp_endpoint(endpoint);
    }
    let tracing_guard = match tracing_config.init() {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize tracing: {}", e);
            std::process::exit(ExitCode::GeneralError.as_i32());
        }
    };
    if tracing_guard.is_exporting() {
        tracing::debug!("Exporting spans over OTLP");
    }

    let _metrics_exporter = if let Some(ref bind_addr) = cli.metrics_bind {
        match MetricsExporter::install(bind_addr) {
            Ok(exporter) => Some(exporter),
            Err(e) => {
                eprintln!("Failed to start metrics exporter: {}", e);
                std::process::exit(ExitCode::GeneralError.as_i32());
            }
        }
    } else {
        None
    };

    let context = match ConfigContext::load(&cli) {
        Ok(context) => context,
        Err(e) => {
            eprintln!("Failed to resolve settings: {:#}", e);
            std::process::exit(e.exit_code().as_i32());
        }
    };

    let cancel = CancellationToken::new();
    let cancel_clone = cancel.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            eprintln!("Failed to listen for Ctrl+C: {}", e);
            return;
        }
        cancel_clone.cancel();
    });

    let exit_code = match run_command(cli.command, &context, &cancel).await {
        Ok(()) => ExitCode::Success,
        Err(e) if is_cancelled_error(&e) => {
            print_cancelled_message();
            ExitCode::Interrupted
        }
        Err(e) => {
            eprintln!("{:#}", e);
            e.exit_code()
        }
    };

    // Flush spans before exiting
    tracing_guard.shutdown();

    std::process::exit(exit_code.as_i32());
}

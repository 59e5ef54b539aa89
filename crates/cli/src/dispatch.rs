//! Command dispatch logic.
//!
//! Responsibilities:
//! - Route parsed CLI arguments to the matching command handler.
//!
//! Does NOT handle:
//! - CLI structure definitions (see `args` module).
//! - Settings resolution (see `config_context` module).

use anyhow::Result;

use crate::args::Commands;
use crate::cancellation::CancellationToken;
use crate::commands;
use crate::config_context::ConfigContext;

pub(crate) async fn run_command(
    command: Commands,
    context: &ConfigContext,
    cancel_token: &CancellationToken,
) -> Result<()> {
    match command {
        Commands::Settings { output } => commands::settings::run(context, output),
        Commands::Request { label, send } => {
            commands::request::run(context, label.as_deref(), send, cancel_token).await
        }
        Commands::Renew { once } => commands::renew::run(context, once, cancel_token).await,
    }
}

//! Renew command implementation.

use anyhow::{Result, bail};
use cfgserver_client::{ClientError, RenewalOutcome};
use tracing::info;

use crate::cancellation::CancellationToken;
use crate::config_context::ConfigContext;

pub async fn run(context: &ConfigContext, once: bool, cancel: &CancellationToken) -> Result<()> {
    let client = context.build_client()?;
    let Some(renewer) = client.renewer() else {
        bail!(
            "No Vault token configured. Set {}:token to enable renewal",
            context.prefix
        );
    };

    if once {
        return match renewer.renew_once().await {
            RenewalOutcome::Renewed => {
                println!("Token renewed at {}", renewer.renew_uri());
                Ok(())
            }
            RenewalOutcome::Rejected(status) => Err(ClientError::ApiError {
                status,
                url: renewer.renew_uri().to_string(),
                message: "Vault token renewal rejected".to_string(),
            }
            .into()),
            RenewalOutcome::Failed => bail!("Vault token renewal failed; see logs for details"),
        };
    }

    client.start_renewal();
    info!(
        period_ms = context.setup.settings.token_renew_rate_ms,
        "Renewing Vault token until interrupted"
    );
    cancel.cancelled().await;
    client.stop_renewal();
    Ok(())
}

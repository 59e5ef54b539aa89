//! Request command implementation.

use anyhow::Result;
use cfgserver_client::ClientError;
use tracing::info;

use crate::cancellation::{CancellationToken, Cancelled};
use crate::config_context::ConfigContext;
use crate::formatters::RequestOutput;

pub async fn run(
    context: &ConfigContext,
    label: Option<&str>,
    send: bool,
    cancel: &CancellationToken,
) -> Result<()> {
    let client = context.build_client()?;
    let builder = client.request(label).await?;

    // Clone before building so the original can still be sent.
    let preview = builder.try_clone().map(|b| b.build()).transpose()?;
    if let Some(ref request) = preview {
        print!("{}", RequestOutput::from_request(request).to_text());
    }

    if send {
        info!("Sending config server request");
        let response = tokio::select! {
            res = builder.send() => res.map_err(ClientError::from)?,
            _ = cancel.cancelled() => return Err(Cancelled.into()),
        };

        let status = response.status();
        let url = response.url().to_string();
        let body = response.text().await.map_err(ClientError::from)?;
        if !status.is_success() {
            return Err(ClientError::ApiError {
                status: status.as_u16(),
                url,
                message: body,
            }
            .into());
        }

        match serde_json::from_str::<serde_json::Value>(&body) {
            Ok(json) => println!("\n{}", serde_json::to_string_pretty(&json)?),
            Err(_) => println!("\n{body}"),
        }
    }

    client.stop_renewal();
    Ok(())
}

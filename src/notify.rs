use std::time::Duration;

use anyhow::Result;
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::store::BoundaryStore;

const USERNAME: &str = "Precinct";
const SEND_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Serialize, Debug)]
struct Embed {
    title: String,
    description: String,
    color: u32,
    timestamp: String,
}

#[derive(Serialize, Debug)]
struct Payload {
    username: String,
    embeds: Vec<Embed>,
}

/// Operator notifications for boundary loads.
///
/// Reports are sent from a spawned task, so loads and snapshot swaps never
/// wait on the webhook endpoint.
#[derive(Clone)]
pub struct Webhook {
    url: String,
    client: reqwest::Client,
}

impl Webhook {
    pub fn new(url: String) -> Result<Self> {
        Self::with_timeout(url, SEND_TIMEOUT)
    }

    pub fn with_timeout(url: String, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("precinct/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;
        Ok(Self { url, client })
    }

    pub async fn send_notification(
        &self,
        title: &str,
        description: &str,
        success: bool,
    ) -> Result<()> {
        let payload = payload(title, description, success);

        let response = self.client.post(&self.url).json(&payload).send().await?;

        if !response.status().is_success() {
            let error_text = response.text().await?;
            error!("Failed to send webhook notification: {}", error_text);
            anyhow::bail!("Webhook notification failed: {}", error_text);
        }

        info!("Sent webhook notification: {}", title);
        Ok(())
    }

    /// Send from a background task; failures are logged, not returned
    pub fn spawn_notification(
        &self,
        title: String,
        description: String,
        success: bool,
    ) -> JoinHandle<()> {
        let webhook = self.clone();
        tokio::spawn(async move {
            if let Err(e) = webhook
                .send_notification(&title, &description, success)
                .await
            {
                warn!("Could not send webhook notification '{}': {:#}", title, e);
            }
        })
    }

    /// Report excluded records from a load. Nothing is sent for a clean load.
    pub fn report_rejections(&self, source: &str, store: &BoundaryStore) -> Option<JoinHandle<()>> {
        let report = store.rejection_report()?;
        Some(self.spawn_notification(
            format!("Malformed boundaries in {}", source),
            report,
            false,
        ))
    }

    pub fn report_failure(&self, source: &str, err: &anyhow::Error) -> JoinHandle<()> {
        self.spawn_notification(
            format!("Boundary load failed: {}", source),
            format!("The previous snapshot stays in service.\n```\n{:#}\n```", err),
            false,
        )
    }
}

fn payload(title: &str, description: &str, success: bool) -> Payload {
    let color = if success { 0x00FF00 } else { 0xFF0000 };

    Payload {
        username: USERNAME.to_string(),
        embeds: vec![Embed {
            title: title.to_string(),
            description: description.to_string(),
            color,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }],
    }
}

use crate::domain::model::AlertReport;
use crate::domain::ports::NotificationSink;
use crate::utils::error::{Result, SentinelError};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Posts the chat message JSON to an incoming-webhook URL (Slack style).
pub struct WebhookSink {
    url: String,
    client: Client,
}

impl WebhookSink {
    pub fn new(url: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { url, client })
    }
}

#[async_trait]
impl NotificationSink for WebhookSink {
    fn name(&self) -> &str {
        "webhook"
    }

    async fn send(&self, report: &AlertReport) -> Result<()> {
        let response = self
            .client
            .post(&self.url)
            .json(&report.chat_message)
            .send()
            .await
            .map_err(|e| SentinelError::transport(self.name(), e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SentinelError::transport(
                self.name(),
                format!("webhook responded {}: {}", status, body),
            ));
        }

        Ok(())
    }
}

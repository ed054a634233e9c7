use std::time::Duration;

use async_trait::async_trait;
use chrono::Local;
use reqwest::{Client, ClientBuilder};
use serde::Serialize;

use crate::{
    alert::{AlertKind, AlertSender},
    config::Config,
    error::{WatchError, WatchResult},
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    kind: &'a str,
    message: Option<&'a str>,
    sent_at: String,
}

/// Posts every alert as JSON to a chat or automation webhook.
pub struct WebhookSender {
    client: Client,
    url: String,
}

impl WebhookSender {
    pub fn new(url: impl Into<String>) -> WatchResult<Self> {
        let client = ClientBuilder::new()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| WatchError::Config(format!("cannot build webhook client: {e}")))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn from_config(config: &Config) -> WatchResult<Box<dyn AlertSender>> {
        let settings = config.senders.webhook.as_ref().ok_or_else(|| {
            WatchError::Config("sender `webhook` needs an [alert.webhook] section".to_string())
        })?;
        Ok(Box::new(Self::new(settings.url.clone())?))
    }
}

#[async_trait]
impl AlertSender for WebhookSender {
    fn id(&self) -> &str {
        "webhook"
    }

    async fn alert(&self, kind: AlertKind, message: Option<&str>) -> anyhow::Result<()> {
        let payload = WebhookPayload {
            kind: kind.as_str(),
            message,
            sent_at: Local::now().to_rfc3339(),
        };
        self.client
            .post(&self.url)
            .json(&payload)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

//! Best-effort PushPlus notifications.

use anyhow::{bail, Context, Result};
use log::{error, info};
use reqwest::{Client, StatusCode};
use serde::Serialize;
use std::time::Duration;

use crate::config::PushPlusConfig;

const TITLE: &str = "Cloudflare DNS 更新通知";
const TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Serialize)]
struct PushPlusMessage<'a> {
    token: &'a str,
    title: &'a str,
    content: &'a str,
    template: &'a str,
    channel: &'a str,
}

pub struct PushPlus {
    client: Client,
    url: String,
    token: String,
}

impl PushPlus {
    pub fn new(config: &PushPlusConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(TIMEOUT_SECS))
            .build()
            .context("Failed to create HTTP client for PushPlus")?;

        Ok(Self {
            client,
            url: config.url.clone(),
            token: config.token.clone(),
        })
    }

    /// Sends `content` as a markdown message. Failures are logged, never returned.
    pub async fn notify(&self, content: &str) {
        match self.send(content).await {
            Ok(()) => info!("PushPlus notification sent"),
            Err(e) => error!("PushPlus notification failed: {:#}", e),
        }
    }

    async fn send(&self, content: &str) -> Result<()> {
        let message = PushPlusMessage {
            token: &self.token,
            title: TITLE,
            content,
            template: "markdown",
            channel: "wechat",
        };

        let response = self
            .client
            .post(&self.url)
            .json(&message)
            .send()
            .await
            .context("Failed to send request to PushPlus")?;

        if response.status() != StatusCode::OK {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            bail!("PushPlus returned {}: {}", status, body);
        }

        Ok(())
    }
}

use anyhow::{bail, Context, Result};
use log::{error, info};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::CloudflareConfig;
use crate::retry::RetryPolicy;

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Zone-scoped Cloudflare DNS client. The bearer token is baked into the
/// default headers once, at construction.
pub struct CloudflareClient {
    client: Client,
    api_base: String,
    zone_id: String,
    retry_delay: Duration,
}

impl CloudflareClient {
    pub fn new(config: &CloudflareConfig, retry_delay: Duration) -> Result<Self> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.api_token))
            .context("CF_API_TOKEN is not a valid header value")?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(HTTP_TIMEOUT)
            .build()
            .context("Failed to create HTTP client for Cloudflare")?;

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            zone_id: config.zone_id.clone(),
            retry_delay,
        })
    }

    fn records_url(&self) -> String {
        format!("{}/zones/{}/dns_records", self.api_base, self.zone_id)
    }

    /// Ids of the zone's records named exactly `name`, in provider order.
    ///
    /// Any failure is logged and yields an empty list; this call is not retried.
    pub async fn list_record_ids(&self, name: &str) -> Vec<String> {
        match self.fetch_records().await {
            Ok(records) => {
                let ids: Vec<String> = records
                    .into_iter()
                    .filter(|r| r.name == name)
                    .map(|r| r.id)
                    .collect();
                info!("Found {} DNS record(s) named {}", ids.len(), name);
                ids
            }
            Err(e) => {
                error!("Failed to fetch DNS records: {:#}", e);
                Vec::new()
            }
        }
    }

    async fn fetch_records(&self) -> Result<Vec<DnsRecord>> {
        let response = self
            .client
            .get(self.records_url())
            .send()
            .await
            .context("Failed to send request to Cloudflare")?;

        if response.status() != StatusCode::OK {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            bail!("Cloudflare API error ({}): {}", status, body);
        }

        let list: CloudflareListResponse = response
            .json()
            .await
            .context("Failed to parse Cloudflare response")?;

        Ok(list.result)
    }

    /// Overwrites one record as an A record pointing at `ip`.
    ///
    /// Returns whether any of the `max_retries` attempts got a 200.
    pub async fn update_record(
        &self,
        record_id: &str,
        name: &str,
        ip: &str,
        max_retries: u32,
    ) -> bool {
        let body = UpdateRecordRequest {
            record_type: "A",
            name,
            content: ip,
        };

        let policy = RetryPolicy::new(max_retries, self.retry_delay);
        let what = format!("Updating {} to {}", name, ip);
        let updated = policy
            .run(&what, || self.put_record(record_id, &body))
            .await
            .is_some();

        if updated {
            info!("Updated {} to {}", name, ip);
        } else {
            error!("Giving up on {} → {} after {} attempt(s)", name, ip, max_retries);
        }
        updated
    }

    async fn put_record(&self, record_id: &str, body: &UpdateRecordRequest<'_>) -> Result<()> {
        let url = format!("{}/{}", self.records_url(), record_id);

        let response = self
            .client
            .put(&url)
            .json(body)
            .send()
            .await
            .context("Failed to send update request to Cloudflare")?;

        if response.status() != StatusCode::OK {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            bail!("Cloudflare API error ({}): {}", status, body);
        }

        Ok(())
    }
}

// Cloudflare API types

#[derive(Debug, Serialize)]
struct UpdateRecordRequest<'a> {
    #[serde(rename = "type")]
    record_type: &'a str,
    name: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct CloudflareListResponse {
    #[serde(default)]
    result: Vec<DnsRecord>,
}

#[derive(Debug, Deserialize)]
struct DnsRecord {
    id: String,
    name: String,
}

use anyhow::{bail, Context, Result};
use log::info;
use reqwest::{Client, StatusCode};
use std::time::Duration;

use crate::config::IpSourceConfig;
use crate::retry::RetryPolicy;

/// Fetches the raw comma-separated candidate list from the ranking page.
///
/// Returns the trimmed body of the first 200 response, or `None` once every
/// attempt has failed.
pub async fn fetch_candidates(
    client: &Client,
    source: &IpSourceConfig,
    retry_delay: Duration,
) -> Option<String> {
    let policy = RetryPolicy::new(source.max_retries, retry_delay);
    let body = policy
        .run("Fetching preferred IPs", || fetch_once(client, source))
        .await?;

    info!("Fetched preferred IP list from {}", source.url);
    Some(body)
}

async fn fetch_once(client: &Client, source: &IpSourceConfig) -> Result<String> {
    let response = client
        .get(&source.url)
        .timeout(source.timeout)
        .send()
        .await
        .context("Failed to send request to IP source")?;

    let status = response.status();
    if status != StatusCode::OK {
        bail!("IP source returned {}", status);
    }

    let text = response
        .text()
        .await
        .context("Failed to read IP source response")?;

    Ok(text.trim().to_string())
}

/// Splits on commas and keeps the dotted-quad tokens, in source order.
pub fn filter_valid(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|token| is_valid_ip(token))
        .map(str::to_string)
        .collect()
}

/// Shape check only: four dot-separated groups of 1-3 ASCII digits.
///
/// Octets are not bounded to 0-255, so `999.999.999.999` passes.
pub fn is_valid_ip(ip: &str) -> bool {
    let groups: Vec<&str> = ip.split('.').collect();
    groups.len() == 4
        && groups
            .iter()
            .all(|g| (1..=3).contains(&g.len()) && g.bytes().all(|b| b.is_ascii_digit()))
}

use anyhow::{Context, Result};
use log::{info, warn};
use reqwest::Client;
use std::fmt;

use crate::config::Config;
use crate::ip;
use crate::notify::PushPlus;
use crate::provider::cloudflare::CloudflareClient;
use crate::provider::UpdateResult;

/// How a run ended. `Display` is the notification text that was sent for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    FetchFailed,
    NoValidIps,
    NoMatchingRecords,
    Updated(Vec<UpdateResult>),
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::FetchFailed => write!(f, "⚠️ 获取优选 IP 失败"),
            Outcome::NoValidIps => write!(f, "⚠️ 未获取到有效 IP 地址"),
            Outcome::NoMatchingRecords => write!(f, "⚠️ 未找到匹配的 DNS 记录"),
            Outcome::Updated(results) => {
                let lines: Vec<String> = results.iter().map(ToString::to_string).collect();
                write!(f, "{}", lines.join("\n"))
            }
        }
    }
}

/// One full fetch → filter → locate → update pass, followed by exactly one
/// notification.
///
/// Only fails if an HTTP client cannot be built, which happens before any
/// request goes out. Every other failure ends up in the returned `Outcome`.
pub async fn run(config: &Config) -> Result<Outcome> {
    let http = Client::builder()
        .build()
        .context("Failed to create HTTP client for IP source")?;
    let cloudflare = CloudflareClient::new(&config.cloudflare, config.retry_delay)?;
    let notifier = PushPlus::new(&config.pushplus)?;

    let outcome = update_records(config, &http, &cloudflare).await;

    match &outcome {
        Outcome::Updated(results) => {
            let failed = results.iter().filter(|r| !r.success).count();
            info!("Run finished: {} updated, {} failed", results.len() - failed, failed);
        }
        other => warn!("Run stopped early: {}", other),
    }

    notifier.notify(&outcome.to_string()).await;
    Ok(outcome)
}

async fn update_records(config: &Config, http: &Client, cloudflare: &CloudflareClient) -> Outcome {
    let raw = match ip::fetch_candidates(http, &config.ip_source, config.retry_delay).await {
        Some(raw) if !raw.is_empty() => raw,
        _ => return Outcome::FetchFailed,
    };

    let ips = ip::filter_valid(&raw);
    if ips.is_empty() {
        return Outcome::NoValidIps;
    }
    info!("{} valid candidate IP(s): {}", ips.len(), ips.join(", "));

    let name = &config.cloudflare.dns_name;
    let record_ids = cloudflare.list_record_ids(name).await;
    if record_ids.is_empty() {
        return Outcome::NoMatchingRecords;
    }

    // Pairing is positional: the i-th ranked IP goes to the i-th record as
    // Cloudflare lists them. Neither side guarantees a stable order, and any
    // surplus on either side is left alone.
    if ips.len() != record_ids.len() {
        info!(
            "{} IP(s) for {} record(s), updating {}",
            ips.len(),
            record_ids.len(),
            ips.len().min(record_ids.len())
        );
    }

    let mut results = Vec::new();
    for (record_id, ip) in record_ids.iter().zip(&ips) {
        let success = cloudflare
            .update_record(record_id, name, ip, config.update_max_retries)
            .await;
        results.push(UpdateResult {
            name: name.clone(),
            ip: ip.clone(),
            success,
        });
    }

    Outcome::Updated(results)
}

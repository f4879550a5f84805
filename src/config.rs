use anyhow::{bail, Result};
use std::fmt;
use std::time::Duration;

const DEFAULT_IP_SOURCE_URL: &str = "https://ip.164746.xyz/ipTop10.html";
const DEFAULT_CLOUDFLARE_API_BASE: &str = "https://api.cloudflare.com/client/v4";
const DEFAULT_PUSHPLUS_URL: &str = "http://www.pushplus.plus/send";

#[derive(Clone)]
pub struct Config {
    pub cloudflare: CloudflareConfig,
    pub pushplus: PushPlusConfig,
    pub ip_source: IpSourceConfig,
    pub update_max_retries: u32,
    /// Fixed pause between retry attempts of any stage.
    pub retry_delay: Duration,
    pub log_level: String,
}

#[derive(Clone)]
pub struct CloudflareConfig {
    pub api_base: String,
    pub api_token: String,
    pub zone_id: String,
    /// Hostname whose A records get rewritten.
    pub dns_name: String,
}

#[derive(Clone)]
pub struct PushPlusConfig {
    pub url: String,
    pub token: String,
}

#[derive(Debug, Clone)]
pub struct IpSourceConfig {
    pub url: String,
    pub timeout: Duration,
    pub max_retries: u32,
}

fn default_update_max_retries() -> u32 {
    3
}

fn default_retry_delay() -> Duration {
    Duration::from_secs(1)
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for IpSourceConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_IP_SOURCE_URL.to_string(),
            timeout: Duration::from_secs(10),
            max_retries: 5,
        }
    }
}

impl Config {
    /// Reads the process environment, after merging a `.env` file if one exists.
    pub fn from_env() -> Result<Self> {
        // 真实环境变量优先于 .env
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &str| match optional(key) {
            Some(value) => Ok(value),
            None => bail!("Environment variable {} is missing", key),
        };

        let cloudflare = CloudflareConfig {
            api_base: optional("CF_API_BASE")
                .unwrap_or_else(|| DEFAULT_CLOUDFLARE_API_BASE.to_string()),
            api_token: required("CF_API_TOKEN")?,
            zone_id: required("CF_ZONE_ID")?,
            dns_name: required("CF_DNS_NAME")?,
        };

        let pushplus = PushPlusConfig {
            url: optional("PUSHPLUS_URL").unwrap_or_else(|| DEFAULT_PUSHPLUS_URL.to_string()),
            token: required("PUSHPLUS_TOKEN")?,
        };

        let mut ip_source = IpSourceConfig::default();
        if let Some(url) = optional("IP_SOURCE_URL") {
            ip_source.url = url;
        }

        Ok(Config {
            cloudflare,
            pushplus,
            ip_source,
            update_max_retries: default_update_max_retries(),
            retry_delay: default_retry_delay(),
            log_level: optional("LOG_LEVEL").unwrap_or_else(default_log_level),
        })
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("cloudflare", &self.cloudflare)
            .field("pushplus", &self.pushplus)
            .field("ip_source", &self.ip_source)
            .field("update_max_retries", &self.update_max_retries)
            .field("retry_delay", &self.retry_delay)
            .field("log_level", &self.log_level)
            .finish()
    }
}

impl fmt::Debug for CloudflareConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CloudflareConfig")
            .field("api_base", &self.api_base)
            .field("api_token", &"<REDACTED>")
            .field("zone_id", &self.zone_id)
            .field("dns_name", &self.dns_name)
            .finish()
    }
}

impl fmt::Debug for PushPlusConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PushPlusConfig")
            .field("url", &self.url)
            .field("token", &"<REDACTED>")
            .finish()
    }
}

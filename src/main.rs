use anyhow::Result;
use log::info;

use dnscf::Config;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Load configuration first (before logger init)
    let config = Config::from_env()?;

    // Env var takes precedence over LOG_LEVEL
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(&config.log_level)
    ).init();

    info!(
        "Updating {} in zone {} from {}",
        config.cloudflare.dns_name, config.cloudflare.zone_id, config.ip_source.url
    );

    dnscf::run(&config).await?;

    Ok(())
}

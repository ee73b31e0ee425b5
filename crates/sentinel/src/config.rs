//! Daemon configuration loading

use anyhow::{Context, Result};
use sentinel_lib::SentinelConfig;

/// Load settings from `SENTINEL_`-prefixed environment variables.
///
/// Missing required settings (subscription, storage account) are fatal:
/// the process must not start a run without them.
pub fn load() -> Result<SentinelConfig> {
    let config = config::Config::builder()
        .add_source(config::Environment::with_prefix("SENTINEL"))
        .build()
        .context("Failed to read configuration from environment")?;

    let config: SentinelConfig = config
        .try_deserialize()
        .context("Configuration is incomplete or malformed")?;

    config.validate().context("Configuration is invalid")?;
    Ok(config)
}

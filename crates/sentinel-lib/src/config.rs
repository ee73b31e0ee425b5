//! Sentinel configuration
//!
//! One explicit struct constructed at process start and passed by
//! reference into the run coordinator and collaborators; core logic
//! never reads the environment on its own.

use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

/// Default scan cadence, every six hours
const DEFAULT_SCAN_INTERVAL_SECS: u64 = 6 * 60 * 60;

fn default_scan_interval() -> u64 {
    DEFAULT_SCAN_INTERVAL_SECS
}

fn default_run_on_startup() -> bool {
    true
}

fn default_api_port() -> u16 {
    8080
}

/// Configuration validation failures, fatal at startup
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("required setting is missing: {0}")]
    Missing(&'static str),

    #[error("invalid setting {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Process-wide settings
#[derive(Debug, Clone, Deserialize)]
pub struct SentinelConfig {
    /// Subscription to scan
    pub subscription_id: String,

    /// Storage account receiving rendered reports
    pub storage_account: String,

    /// Logic App trigger URL; absence disables notification dispatch
    #[serde(default)]
    pub notification_endpoint: Option<String>,

    /// Notification recipient; absence disables dispatch as well
    #[serde(default)]
    pub recipient_email: Option<String>,

    /// Seconds between scheduled runs
    #[serde(default = "default_scan_interval")]
    pub scan_interval_secs: u64,

    /// Run a scan immediately at process start
    #[serde(default = "default_run_on_startup")]
    pub run_on_startup: bool,

    /// Port for the health/metrics API
    #[serde(default = "default_api_port")]
    pub api_port: u16,

    /// Request timeout for all outbound calls. Unset means unbounded,
    /// which matches the documented behavior of every external call.
    #[serde(default)]
    pub http_timeout_secs: Option<u64>,
}

impl SentinelConfig {
    /// Check the settings a run cannot start without
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.subscription_id.trim().is_empty() {
            return Err(ConfigError::Missing("subscription_id"));
        }
        if self.storage_account.trim().is_empty() {
            return Err(ConfigError::Missing("storage_account"));
        }
        if let Some(endpoint) = &self.notification_endpoint {
            url::Url::parse(endpoint).map_err(|e| ConfigError::Invalid {
                name: "notification_endpoint",
                reason: e.to_string(),
            })?;
        }
        if self.scan_interval_secs == 0 {
            return Err(ConfigError::Invalid {
                name: "scan_interval_secs",
                reason: "must be positive".to_string(),
            });
        }
        Ok(())
    }

    pub fn scan_interval(&self) -> Duration {
        Duration::from_secs(self.scan_interval_secs)
    }

    pub fn http_timeout(&self) -> Option<Duration> {
        self.http_timeout_secs.map(Duration::from_secs)
    }

    /// Whether both settings required for dispatch are present
    pub fn notification_configured(&self) -> bool {
        self.notification_endpoint.is_some() && self.recipient_email.is_some()
    }
}

//! Cloud collaborator interfaces
//!
//! This module defines the narrow contracts the decision engine consumes
//! (inventory listing, metric queries, tag reads/writes, report persistence,
//! notification dispatch) and their Azure REST implementations. Everything
//! behind these traits is thin I/O; no classification logic lives here.

mod arm;
mod auth;
mod blob;
mod monitor;
mod webhook;

pub use arm::ArmClient;
pub use auth::{ManagedIdentityCredential, TokenCredential, MANAGEMENT_SCOPE, STORAGE_SCOPE};
pub use blob::BlobReportSink;
pub use monitor::MonitorMetricsSource;
pub use webhook::LogicAppNotifier;

use crate::models::{DiskRecord, PublicIpRecord, ResourceRef};
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

pub use async_trait::async_trait;

/// Tag set of a resource
pub type TagMap = HashMap<String, String>;

/// Errors from cloud collaborators
#[derive(Debug, Error)]
pub enum CloudError {
    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status {status} from {endpoint}: {body}")]
    Status {
        status: u16,
        endpoint: String,
        body: String,
    },

    #[error("malformed response: {0}")]
    Decode(String),

    #[error("invalid endpoint: {0}")]
    Endpoint(String),
}

/// Parameters of a platform-metric query
#[derive(Debug, Clone)]
pub struct MetricQuery {
    /// Metric name (e.g. `Percentage CPU`)
    pub metric: &'static str,
    /// Aggregation applied per period (e.g. `Average`)
    pub aggregation: &'static str,
    /// Lookback window ending now
    pub lookback: chrono::Duration,
    /// ISO-8601 sampling granularity (e.g. `P1D`)
    pub interval: &'static str,
}

/// Subscription inventory access
#[async_trait]
pub trait InventorySource: Send + Sync {
    /// Enumerate all virtual machines in the subscription
    async fn list_vms(&self) -> Result<Vec<ResourceRef>, CloudError>;

    /// Enumerate all managed disks with their attachment state
    async fn list_disks(&self) -> Result<Vec<DiskRecord>, CloudError>;

    /// Enumerate all public IP addresses with their association state
    async fn list_public_ips(&self) -> Result<Vec<PublicIpRecord>, CloudError>;

    /// Per-resource detail fetch: whether the VM is currently running
    async fn vm_is_running(&self, vm: &ResourceRef) -> Result<bool, CloudError>;
}

/// Time-series metric access
#[async_trait]
pub trait MetricsSource: Send + Sync {
    /// Fetch per-period aggregated values for a resource over the query
    /// window. Periods without data are returned as `None`; an empty
    /// series means the backend had nothing for the window.
    async fn query(
        &self,
        resource_id: &str,
        query: &MetricQuery,
    ) -> Result<Vec<Option<f64>>, CloudError>;
}

/// Resource tag metadata access
#[async_trait]
pub trait TagStore: Send + Sync {
    /// Read the current tag set of a resource
    async fn get(&self, resource_id: &str, api_version: &str) -> Result<TagMap, CloudError>;

    /// Write a tag set to a resource, leaving all other resource
    /// properties unchanged
    async fn put(
        &self,
        resource_id: &str,
        api_version: &str,
        tags: &TagMap,
    ) -> Result<(), CloudError>;
}

/// Rendered-report persistence
#[async_trait]
pub trait ReportSink: Send + Sync {
    /// Store a rendered report under the given name
    async fn store(&self, name: &str, body: &str) -> Result<(), CloudError>;
}

/// Operator notification dispatch
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Deliver the rendered report body to a recipient. Any non-2xx
    /// outcome is an error.
    async fn send(&self, recipient: &str, body: &str) -> Result<(), CloudError>;
}

/// Build the shared HTTP client.
///
/// The default carries no request timeout, matching the documented
/// behavior of every external call in this system; `timeout` bounds all
/// requests when set.
pub fn http_client(timeout: Option<Duration>) -> Result<reqwest::Client, CloudError> {
    let mut builder = reqwest::Client::builder();
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder.build().map_err(CloudError::from)
}

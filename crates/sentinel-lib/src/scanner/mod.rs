//! Waste scanning
//!
//! One generic scan driver handles enumeration, classification, tagging,
//! and finding emission; per-kind behavior (what to enumerate, how to
//! derive classification state, which display fields a finding carries)
//! is supplied by [`KindScan`] implementations.

mod disk;
mod ip;
mod vm;

#[cfg(test)]
mod tests;

pub use disk::DiskScan;
pub use ip::IpScan;
pub use vm::VmScan;

use crate::classify;
use crate::cloud::CloudError;
use crate::models::{Finding, ResourceKind, ResourceRef, ResourceState};
use crate::observability::SentinelMetrics;
use crate::tagger::Tagger;
use tracing::{error, info, warn};

pub use async_trait::async_trait;

/// Per-kind behavior consumed by the scan driver
#[async_trait]
pub trait KindScan: Send + Sync {
    /// Inventory item carrying whatever the kind needs downstream
    type Item: Send + Sync;

    fn kind(&self) -> ResourceKind;

    /// Enumerate every resource of this kind in the subscription
    async fn enumerate(&self) -> Result<Vec<Self::Item>, CloudError>;

    fn reference<'a>(&self, item: &'a Self::Item) -> &'a ResourceRef;

    /// Derive the classification state for one resource. Kinds that
    /// need per-resource detail or metric fetches do them here.
    async fn state(&self, item: &Self::Item) -> Result<ResourceState, CloudError>;

    /// Display fields for a classified-and-tagged resource
    fn finding(&self, item: &Self::Item, state: &ResourceState) -> Finding;
}

/// Outcome of scanning one resource kind
#[derive(Debug, Default)]
pub struct ScanResult {
    /// Wasted resources that were successfully tagged, in enumeration order
    pub findings: Vec<Finding>,
    /// Resources enumerated
    pub scanned: usize,
    /// Resources skipped because their state or tag write failed
    pub skipped: usize,
}

/// Drives a [`KindScan`] over the full inventory of its kind.
///
/// Per-resource failures are logged and the resource is omitted; a
/// finding is emitted only after the tag write (or idempotent skip)
/// succeeded.
pub struct ScanDriver {
    tagger: Tagger,
    metrics: SentinelMetrics,
}

impl ScanDriver {
    pub fn new(tagger: Tagger, metrics: SentinelMetrics) -> Self {
        Self { tagger, metrics }
    }

    pub async fn scan<S: KindScan>(&self, kind_scan: &S) -> ScanResult {
        let kind = kind_scan.kind();
        info!(kind = %kind, "Scanning for wasted resources");

        let items = match kind_scan.enumerate().await {
            Ok(items) => items,
            Err(e) => {
                error!(kind = %kind, error = %e, "Failed to enumerate resources");
                self.metrics.inc_scan_errors();
                return ScanResult::default();
            }
        };

        let mut result = ScanResult {
            scanned: items.len(),
            ..ScanResult::default()
        };
        self.metrics.add_resources_scanned(items.len() as i64);

        for item in &items {
            let resource = kind_scan.reference(item);

            let state = match kind_scan.state(item).await {
                Ok(state) => state,
                Err(e) => {
                    warn!(
                        kind = %kind,
                        resource = %resource.short_name(),
                        error = %e,
                        "Could not evaluate resource, skipping"
                    );
                    self.metrics.inc_scan_errors();
                    result.skipped += 1;
                    continue;
                }
            };

            if !classify::is_wasted(&state) {
                continue;
            }

            match self.tagger.apply(resource, kind.tag_value()).await {
                Ok(outcome) => {
                    self.metrics.inc_tag_writes();
                    let finding = kind_scan.finding(item, &state);
                    info!(
                        kind = %kind,
                        resource = %resource.name,
                        resource_group = %finding.resource_group,
                        outcome = ?outcome,
                        "Wasted resource recorded"
                    );
                    result.findings.push(finding);
                    self.metrics.inc_findings();
                }
                Err(e) => {
                    // Tagging gates reporting: an untagged match is not a finding
                    error!(
                        kind = %kind,
                        resource = %resource.short_name(),
                        error = %e,
                        "Error tagging resource"
                    );
                    self.metrics.inc_tag_errors();
                    result.skipped += 1;
                }
            }
        }

        info!(
            kind = %kind,
            scanned = result.scanned,
            findings = result.findings.len(),
            skipped = result.skipped,
            "Scan complete"
        );
        result
    }
}

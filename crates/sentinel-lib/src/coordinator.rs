//! Run coordination
//!
//! Sequences the three scanners, builds the report, and hands it to the
//! persistence and notification collaborators. A run walks a linear
//! state machine; setup errors are fatal, everything past setup is
//! absorbed and logged.

use crate::cloud::{InventorySource, MetricsSource, NotificationSink, ReportSink, TagStore};
use crate::config::SentinelConfig;
use crate::observability::{SentinelMetrics, StructuredLogger};
use crate::report::{html, Report};
use crate::sampler::MetricSampler;
use crate::scanner::{DiskScan, IpScan, KindScan, ScanDriver, ScanResult, VmScan};
use crate::tagger::Tagger;
use anyhow::Result;
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

/// States of the run machine.
///
/// `Init → Authenticated → Scanned` always happen in order; a run then
/// terminates in `ReportedEmpty` or `ReportedAndDispatched`, or in
/// `Failed` from any step on an unrecoverable setup error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Init,
    Authenticated,
    Scanned,
    ReportedEmpty,
    ReportedAndDispatched,
    Failed,
}

impl RunState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunState::Init => "init",
            RunState::Authenticated => "authenticated",
            RunState::Scanned => "scanned",
            RunState::ReportedEmpty => "reported_empty",
            RunState::ReportedAndDispatched => "reported_and_dispatched",
            RunState::Failed => "failed",
        }
    }
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a single run
#[derive(Debug)]
pub struct RunSummary {
    pub state: RunState,
    /// The built report, absent only when setup failed
    pub report: Option<Report>,
    pub persisted: bool,
    pub dispatched: bool,
}

impl RunSummary {
    fn failed() -> Self {
        Self {
            state: RunState::Failed,
            report: None,
            persisted: false,
            dispatched: false,
        }
    }
}

/// Coordinates one waste-detection run end to end
pub struct Coordinator {
    config: SentinelConfig,
    inventory: Arc<dyn InventorySource>,
    metrics_source: Arc<dyn MetricsSource>,
    tag_store: Arc<dyn TagStore>,
    report_sink: Arc<dyn ReportSink>,
    notifier: Option<Arc<dyn NotificationSink>>,
    metrics: SentinelMetrics,
    logger: StructuredLogger,
}

impl Coordinator {
    pub fn builder() -> CoordinatorBuilder {
        CoordinatorBuilder::new()
    }

    /// Execute one run. All failures past setup are absorbed: the
    /// summary reports what happened, it never propagates an error.
    pub async fn run(&self) -> RunSummary {
        self.logger.log_run_started();

        // Init -> Authenticated: required configuration must be present
        // before any resource is touched
        if let Err(e) = self.config.validate() {
            error!(error = %e, "Fatal setup error, aborting run");
            self.logger.log_run_failed(&e.to_string());
            self.metrics.inc_runs_failed();
            return RunSummary::failed();
        }
        debug!(state = %RunState::Authenticated, "Setup complete");

        // Authenticated -> Scanned: scanner-internal failures are
        // absorbed per resource and never fail the run
        let driver = ScanDriver::new(Tagger::new(self.tag_store.clone()), self.metrics.clone());
        let sampler = MetricSampler::new(self.metrics_source.clone());

        let vms = self
            .timed_scan(&driver, &VmScan::new(self.inventory.clone(), sampler))
            .await;
        let disks = self
            .timed_scan(&driver, &DiskScan::new(self.inventory.clone()))
            .await;
        let ips = self
            .timed_scan(&driver, &IpScan::new(self.inventory.clone()))
            .await;
        debug!(state = %RunState::Scanned, "All scanners finished");

        let report = Report::new(vms.findings, disks.findings, ips.findings, Utc::now());

        if report.is_empty() {
            info!("No wasted resources found to report");
            self.metrics.inc_runs_completed();
            self.logger
                .log_run_finished(RunState::ReportedEmpty.as_str(), 0);
            return RunSummary {
                state: RunState::ReportedEmpty,
                report: Some(report),
                persisted: false,
                dispatched: false,
            };
        }

        // Tagging already happened; persistence and notification are
        // best-effort delivery and never fail the run
        let rendered = html::render(&report);
        let persisted = self.persist(&report, &rendered).await;
        let dispatched = self.dispatch(&rendered).await;

        self.metrics.inc_runs_completed();
        self.logger
            .log_run_finished(RunState::ReportedAndDispatched.as_str(), report.total());
        RunSummary {
            state: RunState::ReportedAndDispatched,
            report: Some(report),
            persisted,
            dispatched,
        }
    }

    async fn timed_scan<S: KindScan>(&self, driver: &ScanDriver, kind_scan: &S) -> ScanResult {
        let start = Instant::now();
        let result = driver.scan(kind_scan).await;
        self.metrics
            .observe_scan_latency(start.elapsed().as_secs_f64());
        result
    }

    async fn persist(&self, report: &Report, rendered: &str) -> bool {
        let blob_name = report.blob_name();
        match self.report_sink.store(&blob_name, rendered).await {
            Ok(()) => {
                self.metrics.inc_reports_persisted();
                self.logger.log_report_persisted(&blob_name, report.total());
                true
            }
            Err(e) => {
                error!(blob = %blob_name, error = %e, "Failed to persist report");
                false
            }
        }
    }

    async fn dispatch(&self, rendered: &str) -> bool {
        let (notifier, recipient) = match (&self.notifier, &self.config.recipient_email) {
            (Some(notifier), Some(recipient)) => (notifier, recipient),
            _ => {
                self.logger.log_notification_skipped();
                return false;
            }
        };

        match notifier.send(recipient, rendered).await {
            Ok(()) => {
                self.metrics.inc_notifications_sent();
                self.logger.log_notification_sent(recipient);
                true
            }
            Err(e) => {
                error!(error = %e, "Failed to dispatch notification");
                false
            }
        }
    }
}

/// Builder for wiring a [`Coordinator`] from its collaborators
pub struct CoordinatorBuilder {
    config: Option<SentinelConfig>,
    inventory: Option<Arc<dyn InventorySource>>,
    metrics_source: Option<Arc<dyn MetricsSource>>,
    tag_store: Option<Arc<dyn TagStore>>,
    report_sink: Option<Arc<dyn ReportSink>>,
    notifier: Option<Arc<dyn NotificationSink>>,
}

impl CoordinatorBuilder {
    pub fn new() -> Self {
        Self {
            config: None,
            inventory: None,
            metrics_source: None,
            tag_store: None,
            report_sink: None,
            notifier: None,
        }
    }

    pub fn config(mut self, config: SentinelConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn inventory(mut self, inventory: Arc<dyn InventorySource>) -> Self {
        self.inventory = Some(inventory);
        self
    }

    pub fn metrics_source(mut self, metrics_source: Arc<dyn MetricsSource>) -> Self {
        self.metrics_source = Some(metrics_source);
        self
    }

    pub fn tag_store(mut self, tag_store: Arc<dyn TagStore>) -> Self {
        self.tag_store = Some(tag_store);
        self
    }

    pub fn report_sink(mut self, report_sink: Arc<dyn ReportSink>) -> Self {
        self.report_sink = Some(report_sink);
        self
    }

    /// Optional: absence disables notification dispatch
    pub fn notifier(mut self, notifier: Arc<dyn NotificationSink>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn build(self) -> Result<Coordinator> {
        let config = self
            .config
            .ok_or_else(|| anyhow::anyhow!("Configuration is required"))?;
        let logger = StructuredLogger::new(&config.subscription_id);

        Ok(Coordinator {
            config,
            inventory: self
                .inventory
                .ok_or_else(|| anyhow::anyhow!("Inventory source is required"))?,
            metrics_source: self
                .metrics_source
                .ok_or_else(|| anyhow::anyhow!("Metrics source is required"))?,
            tag_store: self
                .tag_store
                .ok_or_else(|| anyhow::anyhow!("Tag store is required"))?,
            report_sink: self
                .report_sink
                .ok_or_else(|| anyhow::anyhow!("Report sink is required"))?,
            notifier: self.notifier,
            metrics: SentinelMetrics::new(),
            logger,
        })
    }
}

impl Default for CoordinatorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

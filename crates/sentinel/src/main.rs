//! FinOps Sentinel - subscription waste detection daemon
//!
//! Scans the subscription on a fixed schedule for idle VMs, unattached
//! disks, and unassociated public IPs, tags what it finds, and delivers
//! an HTML report.

use anyhow::{Context, Result};
use sentinel_lib::cloud::{
    http_client, ArmClient, BlobReportSink, LogicAppNotifier, ManagedIdentityCredential,
    MonitorMetricsSource, NotificationSink, TokenCredential,
};
use sentinel_lib::health::components;
use sentinel_lib::{Coordinator, HealthRegistry, SentinelMetrics, StructuredLogger};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod api;
mod config;

const SENTINEL_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and env filter
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    info!("Starting finops-sentinel");

    // Missing required configuration is fatal; no resources are touched
    let config = config::load()?;
    info!(subscription = %config.subscription_id, "Sentinel configured");

    let http = http_client(config.http_timeout()).context("Failed to create HTTP client")?;
    let credential: Arc<dyn TokenCredential> =
        Arc::new(ManagedIdentityCredential::new(http.clone()));

    let arm = Arc::new(ArmClient::new(
        http.clone(),
        &config.subscription_id,
        credential.clone(),
    )?);
    let monitor = Arc::new(MonitorMetricsSource::new(http.clone(), credential.clone())?);
    let report_sink = Arc::new(BlobReportSink::new(
        http.clone(),
        &config.storage_account,
        credential.clone(),
    )?);
    let notifier: Option<Arc<dyn NotificationSink>> = match &config.notification_endpoint {
        Some(endpoint) => Some(Arc::new(LogicAppNotifier::new(http.clone(), endpoint)?)),
        None => None,
    };

    // Initialize health registry
    let health_registry = HealthRegistry::new();
    health_registry.register(components::INVENTORY).await;
    health_registry.register(components::METRICS_SOURCE).await;
    health_registry.register(components::TAG_STORE).await;
    health_registry.register(components::REPORT_SINK).await;

    // Initialize metrics and structured logging
    let metrics = SentinelMetrics::new();
    let logger = StructuredLogger::new(&config.subscription_id);
    logger.log_startup(SENTINEL_VERSION);

    let mut builder = Coordinator::builder()
        .config(config.clone())
        .inventory(arm.clone())
        .metrics_source(monitor)
        .tag_store(arm)
        .report_sink(report_sink);
    if let Some(notifier) = notifier {
        builder = builder.notifier(notifier);
    }
    let coordinator = Arc::new(builder.build()?);

    // Create shared application state and start the API server
    let app_state = Arc::new(api::AppState::new(health_registry.clone(), metrics.clone()));
    health_registry.set_ready(true).await;
    let _api_handle = tokio::spawn(api::serve(config.api_port, app_state));

    // Scheduler: fixed cadence, optionally one run at startup. The
    // interval only fires between runs, so runs never overlap.
    let mut ticker = tokio::time::interval(config.scan_interval());
    ticker.tick().await; // first tick completes immediately

    if config.run_on_startup {
        execute_run(coordinator.clone(), &metrics).await;
    }

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                execute_run(coordinator.clone(), &metrics).await;
            }
            _ = tokio::signal::ctrl_c() => {
                logger.log_shutdown("SIGINT received");
                info!("Shutting down");
                break;
            }
        }
    }

    Ok(())
}

/// Run the coordinator inside its own task so that nothing a run does
/// can take down the host process.
async fn execute_run(coordinator: Arc<Coordinator>, metrics: &SentinelMetrics) {
    let handle = tokio::spawn(async move { coordinator.run().await });

    match handle.await {
        Ok(summary) => {
            info!(
                state = %summary.state,
                findings = summary.report.as_ref().map(|r| r.total()).unwrap_or(0),
                persisted = summary.persisted,
                dispatched = summary.dispatched,
                "Run complete"
            );
        }
        Err(e) => {
            error!(error = %e, "Run aborted unexpectedly");
            metrics.inc_runs_failed();
        }
    }
}

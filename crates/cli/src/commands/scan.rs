//! One-shot scan command

use crate::output::{print_info, print_success, print_warning, OutputFormat};
use crate::Cli;
use anyhow::{Context, Result};
use sentinel_lib::cloud::{
    http_client, ArmClient, BlobReportSink, LogicAppNotifier, ManagedIdentityCredential,
    MonitorMetricsSource, NotificationSink, TokenCredential,
};
use sentinel_lib::report::{Report, ReportSection};
use sentinel_lib::{Coordinator, RunState};
use std::sync::Arc;
use tabled::Tabled;

/// Row for finding tables
#[derive(Tabled)]
struct FindingRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Resource Group")]
    resource_group: String,
    #[tabled(rename = "Avg CPU %")]
    avg_cpu: String,
}

pub async fn run(cli: &Cli, no_dispatch: bool) -> Result<()> {
    let config = cli.to_config();
    config
        .validate()
        .context("Cannot scan with this configuration")?;

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
        credential,
    )?);

    let notifier: Option<Arc<dyn NotificationSink>> = match &config.notification_endpoint {
        Some(endpoint) if !no_dispatch => {
            Some(Arc::new(LogicAppNotifier::new(http.clone(), endpoint)?))
        }
        _ => None,
    };

    let mut builder = Coordinator::builder()
        .config(config)
        .inventory(arm.clone())
        .metrics_source(monitor)
        .tag_store(arm)
        .report_sink(report_sink);
    if let Some(notifier) = notifier {
        builder = builder.notifier(notifier);
    }
    let coordinator = builder.build()?;

    print_info("Scanning subscription for wasted resources...");
    let summary = coordinator.run().await;

    if summary.state == RunState::Failed {
        anyhow::bail!("Scan failed, see log output for details");
    }

    let report = summary
        .report
        .context("Scan finished without producing a report")?;

    match cli.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Table => print_report(&report),
    }

    if summary.persisted {
        print_success(&format!("Report stored as {}", report.blob_name()));
    }
    match summary.dispatched {
        true => print_success("Notification dispatched"),
        false if report.total() > 0 && !no_dispatch => {
            print_warning("Notification skipped (endpoint or recipient not configured)")
        }
        false => {}
    }

    Ok(())
}

fn print_report(report: &Report) {
    print_info(&format!(
        "Total potential issues found: {}",
        report.total()
    ));

    for section in &report.sections {
        println!();
        println!(
            "{} {} ({})",
            section.category.icon(),
            section.category.title(),
            section.findings.len()
        );
        if section.findings.is_empty() {
            print_success("No issues found in this category");
        } else {
            print_section_table(section);
        }
    }
}

fn print_section_table(section: &ReportSection) {
    let rows: Vec<FindingRow> = section
        .findings
        .iter()
        .map(|finding| FindingRow {
            name: finding.name.clone(),
            resource_group: finding.resource_group.clone(),
            avg_cpu: finding.avg_cpu.clone().unwrap_or_else(|| "-".to_string()),
        })
        .collect();
    crate::output::print_table(&rows);
}

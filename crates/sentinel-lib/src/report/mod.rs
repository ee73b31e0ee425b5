//! Report aggregation
//!
//! Collects the per-kind scan findings into one immutable report with a
//! fixed category order and a derived total, and renders it for
//! display. Rendering is pure; persistence and dispatch live elsewhere.

pub mod html;

use crate::models::Finding;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Report categories, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    IdleVms,
    UnattachedDisks,
    UnassociatedIps,
}

impl Category {
    pub fn title(&self) -> &'static str {
        match self {
            Category::IdleVms => "Idle Virtual Machines",
            Category::UnattachedDisks => "Unattached Disks",
            Category::UnassociatedIps => "Unassociated Public IPs",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Category::IdleVms => "🖥️",
            Category::UnattachedDisks => "💾",
            Category::UnassociatedIps => "🌐",
        }
    }

    /// Column headers for this category's finding table
    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            Category::IdleVms => &["VM Name", "Resource Group", "Avg CPU %"],
            Category::UnattachedDisks => &["Disk Name", "Resource Group"],
            Category::UnassociatedIps => &["IP Name", "Resource Group"],
        }
    }
}

/// One category's findings, in scanner emission order
#[derive(Debug, Clone, Serialize)]
pub struct ReportSection {
    pub category: Category,
    pub findings: Vec<Finding>,
}

/// Aggregated scan report, immutable after construction
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub generated_at: DateTime<Utc>,
    pub sections: Vec<ReportSection>,
}

impl Report {
    pub fn new(
        idle_vms: Vec<Finding>,
        unattached_disks: Vec<Finding>,
        unassociated_ips: Vec<Finding>,
        generated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            generated_at,
            sections: vec![
                ReportSection {
                    category: Category::IdleVms,
                    findings: idle_vms,
                },
                ReportSection {
                    category: Category::UnattachedDisks,
                    findings: unattached_disks,
                },
                ReportSection {
                    category: Category::UnassociatedIps,
                    findings: unassociated_ips,
                },
            ],
        }
    }

    /// Total findings across all categories
    pub fn total(&self) -> usize {
        self.sections.iter().map(|s| s.findings.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Persistence name, minute precision
    pub fn blob_name(&self) -> String {
        format!(
            "FinOps-Report-{}.html",
            self.generated_at.format("%Y-%m-%d-%H%M")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn finding(name: &str) -> Finding {
        Finding {
            name: name.to_string(),
            resource_group: "rg-test".to_string(),
            avg_cpu: None,
        }
    }

    #[test]
    fn test_total_sums_all_categories() {
        let report = Report::new(
            vec![finding("vm-1")],
            vec![finding("d-1"), finding("d-2")],
            vec![],
            Utc::now(),
        );
        assert_eq!(report.total(), 3);
        assert!(!report.is_empty());
    }

    #[test]
    fn test_empty_report() {
        let report = Report::new(vec![], vec![], vec![], Utc::now());
        assert_eq!(report.total(), 0);
        assert!(report.is_empty());
    }

    #[test]
    fn test_category_order_is_fixed() {
        let report = Report::new(vec![], vec![], vec![], Utc::now());
        let categories: Vec<Category> = report.sections.iter().map(|s| s.category).collect();
        assert_eq!(
            categories,
            vec![
                Category::IdleVms,
                Category::UnattachedDisks,
                Category::UnassociatedIps
            ]
        );
    }

    #[test]
    fn test_findings_preserve_emission_order() {
        let report = Report::new(
            vec![],
            vec![finding("first"), finding("second"), finding("third")],
            vec![],
            Utc::now(),
        );
        let names: Vec<&str> = report.sections[1]
            .findings
            .iter()
            .map(|f| f.name.as_str())
            .collect();
        assert_eq!(names, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_blob_name_has_minute_precision() {
        let generated = Utc.with_ymd_and_hms(2025, 6, 8, 12, 30, 45).unwrap();
        let report = Report::new(vec![], vec![], vec![], generated);
        assert_eq!(report.blob_name(), "FinOps-Report-2025-06-08-1230.html");
    }
}

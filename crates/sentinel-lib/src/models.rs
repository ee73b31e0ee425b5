//! Core data models for waste detection

use serde::{Deserialize, Serialize};

/// Resource-group position in an ARM resource id
/// (`/subscriptions/<sub>/resourceGroups/<rg>/providers/...`).
const RESOURCE_GROUP_SEGMENT: usize = 4;

/// The billable resource kinds the sentinel scans
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Vm,
    Disk,
    PublicIp,
}

impl ResourceKind {
    /// ARM api-version token for this kind's provider type
    pub fn api_version(&self) -> &'static str {
        match self {
            ResourceKind::Vm => "2024-03-01",
            ResourceKind::Disk => "2024-03-02",
            ResourceKind::PublicIp => "2023-11-01",
        }
    }

    /// Status tag value written onto wasted resources of this kind
    pub fn tag_value(&self) -> &'static str {
        match self {
            ResourceKind::Vm => "Waste-Candidate-Idle-VM",
            ResourceKind::Disk => "Waste-Candidate-Disk",
            ResourceKind::PublicIp => "Waste-Candidate-IP",
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceKind::Vm => write!(f, "vm"),
            ResourceKind::Disk => write!(f, "disk"),
            ResourceKind::PublicIp => write!(f, "public_ip"),
        }
    }
}

/// Reference to a resource as read from the subscription inventory.
///
/// Immutable once constructed; the resource group is derived from the
/// fixed positional segment of the hierarchical id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRef {
    /// Full ARM resource id
    pub id: String,
    /// Display name
    pub name: String,
    pub kind: ResourceKind,
}

impl ResourceRef {
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: ResourceKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
        }
    }

    /// Resource-group name extracted from the id path
    pub fn resource_group(&self) -> &str {
        self.id
            .split('/')
            .nth(RESOURCE_GROUP_SEGMENT)
            .unwrap_or_default()
    }

    /// Last id segment, used when logging per-resource failures
    pub fn short_name(&self) -> &str {
        self.id.rsplit('/').next().unwrap_or(&self.id)
    }
}

/// Kind-specific raw attributes relevant to classification
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceState {
    Vm {
        running: bool,
        /// Windowed average CPU percentage; `None` when the metrics
        /// backend returned no data
        avg_cpu: Option<f64>,
    },
    Disk {
        attached: bool,
    },
    PublicIp {
        associated: bool,
    },
}

/// Disk inventory entry with its attachment reference state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiskRecord {
    pub reference: ResourceRef,
    /// Whether a compute instance currently owns the disk
    pub attached: bool,
}

/// Public IP inventory entry with its association state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicIpRecord {
    pub reference: ResourceRef,
    /// Whether an IP configuration is bound to the address
    pub associated: bool,
}

/// A wasted resource that was classified and successfully tagged.
///
/// Findings are append-only per scan and carry only display fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub name: String,
    pub resource_group: String,
    /// Formatted average CPU (e.g. `"4.50%"`), present for idle VMs only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_cpu: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_group_from_id() {
        let vm = ResourceRef::new(
            "/subscriptions/sub-1/resourceGroups/rg-prod/providers/Microsoft.Compute/virtualMachines/web-01",
            "web-01",
            ResourceKind::Vm,
        );
        assert_eq!(vm.resource_group(), "rg-prod");
        assert_eq!(vm.short_name(), "web-01");
    }

    #[test]
    fn test_resource_group_malformed_id() {
        let r = ResourceRef::new("not-a-path", "x", ResourceKind::Disk);
        assert_eq!(r.resource_group(), "");
        assert_eq!(r.short_name(), "not-a-path");
    }

    #[test]
    fn test_kind_tag_values() {
        assert_eq!(ResourceKind::Vm.tag_value(), "Waste-Candidate-Idle-VM");
        assert_eq!(ResourceKind::Disk.tag_value(), "Waste-Candidate-Disk");
        assert_eq!(ResourceKind::PublicIp.tag_value(), "Waste-Candidate-IP");
    }
}

//! Scanner behavior tests against synthetic inventories

use super::*;
use crate::cloud::{CloudError, InventorySource, MetricQuery, MetricsSource, TagMap, TagStore};
use crate::models::{DiskRecord, PublicIpRecord, ResourceKind, ResourceRef};
use crate::sampler::MetricSampler;
use crate::tagger::{Tagger, FINOPS_STATUS_TAG};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

fn vm_ref(name: &str) -> ResourceRef {
    ResourceRef::new(
        format!(
            "/subscriptions/sub-1/resourceGroups/rg-test/providers/Microsoft.Compute/virtualMachines/{}",
            name
        ),
        name,
        ResourceKind::Vm,
    )
}

fn disk_record(name: &str, attached: bool) -> DiskRecord {
    DiskRecord {
        reference: ResourceRef::new(
            format!(
                "/subscriptions/sub-1/resourceGroups/rg-test/providers/Microsoft.Compute/disks/{}",
                name
            ),
            name,
            ResourceKind::Disk,
        ),
        attached,
    }
}

fn ip_record(name: &str, associated: bool) -> PublicIpRecord {
    PublicIpRecord {
        reference: ResourceRef::new(
            format!(
                "/subscriptions/sub-1/resourceGroups/rg-test/providers/Microsoft.Network/publicIPAddresses/{}",
                name
            ),
            name,
            ResourceKind::PublicIp,
        ),
        associated,
    }
}

#[derive(Default)]
struct MockInventory {
    vms: Vec<ResourceRef>,
    running: HashMap<String, bool>,
    detail_failures: HashSet<String>,
    disks: Vec<DiskRecord>,
    ips: Vec<PublicIpRecord>,
}

#[async_trait]
impl InventorySource for MockInventory {
    async fn list_vms(&self) -> Result<Vec<ResourceRef>, CloudError> {
        Ok(self.vms.clone())
    }

    async fn list_disks(&self) -> Result<Vec<DiskRecord>, CloudError> {
        Ok(self.disks.clone())
    }

    async fn list_public_ips(&self) -> Result<Vec<PublicIpRecord>, CloudError> {
        Ok(self.ips.clone())
    }

    async fn vm_is_running(&self, vm: &ResourceRef) -> Result<bool, CloudError> {
        if self.detail_failures.contains(&vm.id) {
            return Err(CloudError::Decode("instance view unavailable".into()));
        }
        Ok(self.running.get(&vm.id).copied().unwrap_or(false))
    }
}

#[derive(Default)]
struct MockMetrics {
    series: HashMap<String, Vec<Option<f64>>>,
    calls: AtomicUsize,
}

#[async_trait]
impl MetricsSource for MockMetrics {
    async fn query(
        &self,
        resource_id: &str,
        _query: &MetricQuery,
    ) -> Result<Vec<Option<f64>>, CloudError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.series.get(resource_id).cloned().unwrap_or_default())
    }
}

#[derive(Default)]
struct RecordingTagStore {
    tags: Mutex<HashMap<String, TagMap>>,
    writes: AtomicUsize,
    write_failures: HashSet<String>,
}

#[async_trait]
impl TagStore for RecordingTagStore {
    async fn get(&self, id: &str, _api_version: &str) -> Result<TagMap, CloudError> {
        Ok(self.tags.lock().await.get(id).cloned().unwrap_or_default())
    }

    async fn put(&self, id: &str, _api_version: &str, tags: &TagMap) -> Result<(), CloudError> {
        if self.write_failures.contains(id) {
            return Err(CloudError::Decode("tag write rejected".into()));
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.tags.lock().await.insert(id.to_string(), tags.clone());
        Ok(())
    }
}

fn driver(store: Arc<RecordingTagStore>) -> ScanDriver {
    ScanDriver::new(Tagger::new(store), SentinelMetrics::new())
}

#[tokio::test]
async fn test_running_vm_below_threshold_yields_finding() {
    let vm = vm_ref("web-01");
    let mut inventory = MockInventory {
        vms: vec![vm.clone()],
        ..MockInventory::default()
    };
    inventory.running.insert(vm.id.clone(), true);

    let mut metrics = MockMetrics::default();
    metrics
        .series
        .insert(vm.id.clone(), vec![Some(4.0), Some(5.0)]);

    let store = Arc::new(RecordingTagStore::default());
    let scan = VmScan::new(
        Arc::new(inventory),
        MetricSampler::new(Arc::new(metrics)),
    );

    let result = driver(store.clone()).scan(&scan).await;

    assert_eq!(result.findings.len(), 1);
    let finding = &result.findings[0];
    assert_eq!(finding.name, "web-01");
    assert_eq!(finding.resource_group, "rg-test");
    assert_eq!(finding.avg_cpu.as_deref(), Some("4.50%"));

    let tags = store.tags.lock().await;
    assert_eq!(
        tags[&vm.id].get(FINOPS_STATUS_TAG).map(String::as_str),
        Some("Waste-Candidate-Idle-VM")
    );
}

#[tokio::test]
async fn test_vm_at_threshold_is_not_reported() {
    let vm = vm_ref("busy-01");
    let mut inventory = MockInventory {
        vms: vec![vm.clone()],
        ..MockInventory::default()
    };
    inventory.running.insert(vm.id.clone(), true);

    let mut metrics = MockMetrics::default();
    metrics.series.insert(vm.id.clone(), vec![Some(10.0)]);

    let store = Arc::new(RecordingTagStore::default());
    let scan = VmScan::new(
        Arc::new(inventory),
        MetricSampler::new(Arc::new(metrics)),
    );

    let result = driver(store.clone()).scan(&scan).await;

    assert!(result.findings.is_empty());
    assert_eq!(store.writes.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_stopped_vm_skips_metric_sampling() {
    let vm = vm_ref("stopped-01");
    let mut inventory = MockInventory {
        vms: vec![vm.clone()],
        ..MockInventory::default()
    };
    inventory.running.insert(vm.id.clone(), false);

    let metrics = Arc::new(MockMetrics::default());
    let store = Arc::new(RecordingTagStore::default());
    let scan = VmScan::new(Arc::new(inventory), MetricSampler::new(metrics.clone()));

    let result = driver(store.clone()).scan(&scan).await;

    assert!(result.findings.is_empty());
    // No metric query and no tag write for a stopped VM
    assert_eq!(metrics.calls.load(Ordering::SeqCst), 0);
    assert_eq!(store.writes.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_vm_without_metric_data_is_skipped() {
    let vm = vm_ref("quiet-01");
    let mut inventory = MockInventory {
        vms: vec![vm.clone()],
        ..MockInventory::default()
    };
    inventory.running.insert(vm.id.clone(), true);

    // Empty series: the sampler reports "no data"
    let store = Arc::new(RecordingTagStore::default());
    let scan = VmScan::new(
        Arc::new(inventory),
        MetricSampler::new(Arc::new(MockMetrics::default())),
    );

    let result = driver(store.clone()).scan(&scan).await;

    assert!(result.findings.is_empty());
    assert_eq!(store.writes.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_detail_fetch_failure_skips_resource_only() {
    let broken = vm_ref("broken-01");
    let idle = vm_ref("idle-01");
    let mut inventory = MockInventory {
        vms: vec![broken.clone(), idle.clone()],
        ..MockInventory::default()
    };
    inventory.detail_failures.insert(broken.id.clone());
    inventory.running.insert(idle.id.clone(), true);

    let mut metrics = MockMetrics::default();
    metrics.series.insert(idle.id.clone(), vec![Some(1.0)]);

    let store = Arc::new(RecordingTagStore::default());
    let scan = VmScan::new(
        Arc::new(inventory),
        MetricSampler::new(Arc::new(metrics)),
    );

    let result = driver(store).scan(&scan).await;

    // The failing VM is skipped, the scan itself continues
    assert_eq!(result.scanned, 2);
    assert_eq!(result.skipped, 1);
    assert_eq!(result.findings.len(), 1);
    assert_eq!(result.findings[0].name, "idle-01");
}

#[tokio::test]
async fn test_unattached_disks_tagged_and_reported_in_order() {
    let inventory = MockInventory {
        disks: vec![
            disk_record("data-01", false),
            disk_record("os-disk", true),
            disk_record("data-02", false),
        ],
        ..MockInventory::default()
    };

    let store = Arc::new(RecordingTagStore::default());
    let scan = DiskScan::new(Arc::new(inventory));

    let result = driver(store.clone()).scan(&scan).await;

    // Attached disk is neither tagged nor reported; order is preserved
    let names: Vec<&str> = result.findings.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["data-01", "data-02"]);
    assert_eq!(store.writes.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_tag_failure_excludes_finding() {
    let first = disk_record("flaky", false);
    let second = disk_record("loose", false);
    let mut store = RecordingTagStore::default();
    store.write_failures.insert(first.reference.id.clone());
    let store = Arc::new(store);

    let inventory = MockInventory {
        disks: vec![first, second],
        ..MockInventory::default()
    };
    let scan = DiskScan::new(Arc::new(inventory));

    let result = driver(store.clone()).scan(&scan).await;

    // The classified-but-untagged disk must not appear in the findings
    assert_eq!(result.findings.len(), 1);
    assert_eq!(result.findings[0].name, "loose");
    assert_eq!(result.skipped, 1);
}

#[tokio::test]
async fn test_unassociated_ips_reported() {
    let inventory = MockInventory {
        ips: vec![ip_record("ip-free", false), ip_record("ip-bound", true)],
        ..MockInventory::default()
    };

    let store = Arc::new(RecordingTagStore::default());
    let scan = IpScan::new(Arc::new(inventory));

    let result = driver(store.clone()).scan(&scan).await;

    assert_eq!(result.findings.len(), 1);
    assert_eq!(result.findings[0].name, "ip-free");
    let tags = store.tags.lock().await;
    let tagged: Vec<_> = tags.values().collect();
    assert_eq!(tagged.len(), 1);
    assert_eq!(
        tagged[0].get(FINOPS_STATUS_TAG).map(String::as_str),
        Some("Waste-Candidate-IP")
    );
}

#[tokio::test]
async fn test_already_tagged_resource_still_reported() {
    let disk = disk_record("tagged-before", false);
    let mut tags = TagMap::new();
    tags.insert(
        FINOPS_STATUS_TAG.to_string(),
        "Waste-Candidate-Disk".to_string(),
    );
    let store = RecordingTagStore::default();
    store
        .tags
        .try_lock()
        .unwrap()
        .insert(disk.reference.id.clone(), tags);
    let store = Arc::new(store);

    let inventory = MockInventory {
        disks: vec![disk],
        ..MockInventory::default()
    };
    let result = driver(store.clone()).scan(&DiskScan::new(Arc::new(inventory))).await;

    // Idempotent skip still counts as tagging success
    assert_eq!(result.findings.len(), 1);
    assert_eq!(store.writes.load(Ordering::SeqCst), 0);
}

//! Unattached disk scan

use super::KindScan;
use crate::cloud::{CloudError, InventorySource};
use crate::models::{DiskRecord, Finding, ResourceKind, ResourceRef, ResourceState};
use async_trait::async_trait;
use std::sync::Arc;

pub struct DiskScan {
    inventory: Arc<dyn InventorySource>,
}

impl DiskScan {
    pub fn new(inventory: Arc<dyn InventorySource>) -> Self {
        Self { inventory }
    }
}

#[async_trait]
impl KindScan for DiskScan {
    type Item = DiskRecord;

    fn kind(&self) -> ResourceKind {
        ResourceKind::Disk
    }

    async fn enumerate(&self) -> Result<Vec<DiskRecord>, CloudError> {
        self.inventory.list_disks().await
    }

    fn reference<'a>(&self, item: &'a DiskRecord) -> &'a ResourceRef {
        &item.reference
    }

    async fn state(&self, item: &DiskRecord) -> Result<ResourceState, CloudError> {
        // The attachment reference comes with the inventory listing
        Ok(ResourceState::Disk {
            attached: item.attached,
        })
    }

    fn finding(&self, item: &DiskRecord, _state: &ResourceState) -> Finding {
        Finding {
            name: item.reference.name.clone(),
            resource_group: item.reference.resource_group().to_string(),
            avg_cpu: None,
        }
    }
}

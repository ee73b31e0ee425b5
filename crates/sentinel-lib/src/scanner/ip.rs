//! Unassociated public IP scan

use super::KindScan;
use crate::cloud::{CloudError, InventorySource};
use crate::models::{Finding, PublicIpRecord, ResourceKind, ResourceRef, ResourceState};
use async_trait::async_trait;
use std::sync::Arc;

pub struct IpScan {
    inventory: Arc<dyn InventorySource>,
}

impl IpScan {
    pub fn new(inventory: Arc<dyn InventorySource>) -> Self {
        Self { inventory }
    }
}

#[async_trait]
impl KindScan for IpScan {
    type Item = PublicIpRecord;

    fn kind(&self) -> ResourceKind {
        ResourceKind::PublicIp
    }

    async fn enumerate(&self) -> Result<Vec<PublicIpRecord>, CloudError> {
        self.inventory.list_public_ips().await
    }

    fn reference<'a>(&self, item: &'a PublicIpRecord) -> &'a ResourceRef {
        &item.reference
    }

    async fn state(&self, item: &PublicIpRecord) -> Result<ResourceState, CloudError> {
        Ok(ResourceState::PublicIp {
            associated: item.associated,
        })
    }

    fn finding(&self, item: &PublicIpRecord, _state: &ResourceState) -> Finding {
        Finding {
            name: item.reference.name.clone(),
            resource_group: item.reference.resource_group().to_string(),
            avg_cpu: None,
        }
    }
}

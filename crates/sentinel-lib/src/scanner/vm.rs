//! Idle virtual machine scan
//!
//! A VM needs a per-resource instance-view fetch for its power state,
//! and a metric sample only when it is actually running.

use super::KindScan;
use crate::cloud::{CloudError, InventorySource};
use crate::models::{Finding, ResourceKind, ResourceRef, ResourceState};
use crate::sampler::MetricSampler;
use async_trait::async_trait;
use std::sync::Arc;

pub struct VmScan {
    inventory: Arc<dyn InventorySource>,
    sampler: MetricSampler,
}

impl VmScan {
    pub fn new(inventory: Arc<dyn InventorySource>, sampler: MetricSampler) -> Self {
        Self { inventory, sampler }
    }
}

#[async_trait]
impl KindScan for VmScan {
    type Item = ResourceRef;

    fn kind(&self) -> ResourceKind {
        ResourceKind::Vm
    }

    async fn enumerate(&self) -> Result<Vec<ResourceRef>, CloudError> {
        self.inventory.list_vms().await
    }

    fn reference<'a>(&self, item: &'a ResourceRef) -> &'a ResourceRef {
        item
    }

    async fn state(&self, item: &ResourceRef) -> Result<ResourceState, CloudError> {
        let running = self.inventory.vm_is_running(item).await?;
        if !running {
            // Stopped VMs are never idle; don't spend a metrics call on them
            return Ok(ResourceState::Vm {
                running: false,
                avg_cpu: None,
            });
        }

        let avg_cpu = self.sampler.average_cpu(&item.id).await?;
        Ok(ResourceState::Vm {
            running: true,
            avg_cpu,
        })
    }

    fn finding(&self, item: &ResourceRef, state: &ResourceState) -> Finding {
        let avg_cpu = match state {
            ResourceState::Vm {
                avg_cpu: Some(cpu), ..
            } => Some(format!("{:.2}%", cpu)),
            _ => None,
        };
        Finding {
            name: item.name.clone(),
            resource_group: item.resource_group().to_string(),
            avg_cpu,
        }
    }
}

//! Azure Resource Manager client
//!
//! Implements subscription inventory listing (with `nextLink` paging),
//! the per-VM instance-view detail fetch, and resource tag reads/writes.

use super::{
    CloudError, InventorySource, TagMap, TagStore, TokenCredential, MANAGEMENT_SCOPE,
};
use crate::models::{DiskRecord, PublicIpRecord, ResourceKind, ResourceRef};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;
use url::Url;

/// Default ARM endpoint
const ARM_ENDPOINT: &str = "https://management.azure.com";

/// Instance-view status code reported by running VMs
const POWER_STATE_RUNNING: &str = "PowerState/running";

/// One page of an ARM list response
#[derive(Debug, Deserialize)]
struct ArmPage {
    #[serde(default)]
    value: Vec<Value>,
    #[serde(rename = "nextLink")]
    next_link: Option<String>,
}

#[derive(Debug, Deserialize)]
struct InstanceView {
    #[serde(default)]
    statuses: Vec<InstanceViewStatus>,
}

#[derive(Debug, Deserialize)]
struct InstanceViewStatus {
    #[serde(default)]
    code: String,
}

/// Azure Resource Manager REST client
pub struct ArmClient {
    http: reqwest::Client,
    base: Url,
    subscription_id: String,
    credential: Arc<dyn TokenCredential>,
}

impl ArmClient {
    pub fn new(
        http: reqwest::Client,
        subscription_id: impl Into<String>,
        credential: Arc<dyn TokenCredential>,
    ) -> Result<Self, CloudError> {
        Self::with_endpoint(http, ARM_ENDPOINT, subscription_id, credential)
    }

    /// Construct against a non-default management endpoint (used by tests)
    pub fn with_endpoint(
        http: reqwest::Client,
        endpoint: &str,
        subscription_id: impl Into<String>,
        credential: Arc<dyn TokenCredential>,
    ) -> Result<Self, CloudError> {
        let base = Url::parse(endpoint).map_err(|e| CloudError::Endpoint(e.to_string()))?;
        Ok(Self {
            http,
            base,
            subscription_id: subscription_id.into(),
            credential,
        })
    }

    fn url(&self, path: &str, api_version: &str) -> Result<Url, CloudError> {
        let mut url = self
            .base
            .join(path)
            .map_err(|e| CloudError::Endpoint(e.to_string()))?;
        url.query_pairs_mut().append_pair("api-version", api_version);
        Ok(url)
    }

    async fn get_json(&self, url: Url) -> Result<Value, CloudError> {
        let token = self.credential.token(MANAGEMENT_SCOPE).await?;
        let response = self.http.get(url.clone()).bearer_auth(token).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CloudError::Status {
                status: status.as_u16(),
                endpoint: url.path().to_string(),
                body,
            });
        }
        Ok(response.json().await?)
    }

    /// Walk every page of a list endpoint, in enumeration order
    async fn list_all(&self, path: &str, api_version: &str) -> Result<Vec<Value>, CloudError> {
        let mut items = Vec::new();
        let mut next = Some(self.url(path, api_version)?);

        while let Some(url) = next {
            let page: ArmPage = serde_json::from_value(self.get_json(url).await?)
                .map_err(|e| CloudError::Decode(e.to_string()))?;
            items.extend(page.value);
            next = match page.next_link {
                Some(link) => {
                    Some(Url::parse(&link).map_err(|e| CloudError::Endpoint(e.to_string()))?)
                }
                None => None,
            };
        }

        debug!(path = %path, count = items.len(), "Listed inventory page set");
        Ok(items)
    }

    fn provider_path(&self, provider_type: &str) -> String {
        format!(
            "/subscriptions/{}/providers/{}",
            self.subscription_id, provider_type
        )
    }

    fn reference(item: &Value, kind: ResourceKind) -> Result<ResourceRef, CloudError> {
        let id = item["id"]
            .as_str()
            .ok_or_else(|| CloudError::Decode("inventory item without id".into()))?;
        let name = item["name"].as_str().unwrap_or_default();
        Ok(ResourceRef::new(id, name, kind))
    }
}

#[async_trait]
impl InventorySource for ArmClient {
    async fn list_vms(&self) -> Result<Vec<ResourceRef>, CloudError> {
        let items = self
            .list_all(
                &self.provider_path("Microsoft.Compute/virtualMachines"),
                ResourceKind::Vm.api_version(),
            )
            .await?;
        items
            .iter()
            .map(|item| Self::reference(item, ResourceKind::Vm))
            .collect()
    }

    async fn list_disks(&self) -> Result<Vec<DiskRecord>, CloudError> {
        let items = self
            .list_all(
                &self.provider_path("Microsoft.Compute/disks"),
                ResourceKind::Disk.api_version(),
            )
            .await?;
        items
            .iter()
            .map(|item| {
                Ok(DiskRecord {
                    reference: Self::reference(item, ResourceKind::Disk)?,
                    attached: !item["managedBy"].is_null(),
                })
            })
            .collect()
    }

    async fn list_public_ips(&self) -> Result<Vec<PublicIpRecord>, CloudError> {
        let items = self
            .list_all(
                &self.provider_path("Microsoft.Network/publicIPAddresses"),
                ResourceKind::PublicIp.api_version(),
            )
            .await?;
        items
            .iter()
            .map(|item| {
                Ok(PublicIpRecord {
                    reference: Self::reference(item, ResourceKind::PublicIp)?,
                    associated: !item["properties"]["ipConfiguration"].is_null(),
                })
            })
            .collect()
    }

    async fn vm_is_running(&self, vm: &ResourceRef) -> Result<bool, CloudError> {
        let url = self.url(
            &format!("{}/instanceView", vm.id),
            ResourceKind::Vm.api_version(),
        )?;
        let view: InstanceView = serde_json::from_value(self.get_json(url).await?)
            .map_err(|e| CloudError::Decode(e.to_string()))?;
        Ok(view
            .statuses
            .iter()
            .any(|status| status.code == POWER_STATE_RUNNING))
    }
}

#[async_trait]
impl TagStore for ArmClient {
    async fn get(&self, resource_id: &str, api_version: &str) -> Result<TagMap, CloudError> {
        let body = self.get_json(self.url(resource_id, api_version)?).await?;
        let tags = match body.get("tags") {
            Some(Value::Object(map)) => map
                .iter()
                .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
                .collect(),
            _ => TagMap::new(),
        };
        Ok(tags)
    }

    async fn put(
        &self,
        resource_id: &str,
        api_version: &str,
        tags: &TagMap,
    ) -> Result<(), CloudError> {
        let url = self.url(resource_id, api_version)?;
        let token = self.credential.token(MANAGEMENT_SCOPE).await?;

        // PATCH updates the tag set and leaves every other property alone
        let response = self
            .http
            .patch(url.clone())
            .bearer_auth(token)
            .json(&serde_json::json!({ "tags": tags }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CloudError::Status {
                status: status.as_u16(),
                endpoint: url.path().to_string(),
                body,
            });
        }
        Ok(())
    }
}

//! Blob storage report sink
//!
//! Uploads rendered reports into the `finops-reports` container as
//! block blobs with a hypertext content type.

use super::{CloudError, ReportSink, TokenCredential, STORAGE_SCOPE};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;
use url::Url;

/// Container every report lands in
const REPORT_CONTAINER: &str = "finops-reports";

/// Storage service version required for bearer-token authorization
const STORAGE_API_VERSION: &str = "2021-08-06";

/// Content type stamped on stored reports
const REPORT_CONTENT_TYPE: &str = "text/html";

/// Report sink backed by an Azure Storage account
pub struct BlobReportSink {
    http: reqwest::Client,
    base: Url,
    credential: Arc<dyn TokenCredential>,
}

impl BlobReportSink {
    pub fn new(
        http: reqwest::Client,
        storage_account: &str,
        credential: Arc<dyn TokenCredential>,
    ) -> Result<Self, CloudError> {
        let endpoint = format!("https://{}.blob.core.windows.net", storage_account);
        Self::with_endpoint(http, &endpoint, credential)
    }

    /// Construct against a non-default blob endpoint (used by tests)
    pub fn with_endpoint(
        http: reqwest::Client,
        endpoint: &str,
        credential: Arc<dyn TokenCredential>,
    ) -> Result<Self, CloudError> {
        let base = Url::parse(endpoint).map_err(|e| CloudError::Endpoint(e.to_string()))?;
        Ok(Self {
            http,
            base,
            credential,
        })
    }
}

#[async_trait]
impl ReportSink for BlobReportSink {
    async fn store(&self, name: &str, body: &str) -> Result<(), CloudError> {
        let url = self
            .base
            .join(&format!("/{}/{}", REPORT_CONTAINER, name))
            .map_err(|e| CloudError::Endpoint(e.to_string()))?;
        let token = self.credential.token(STORAGE_SCOPE).await?;

        let response = self
            .http
            .put(url.clone())
            .bearer_auth(token)
            .header("x-ms-version", STORAGE_API_VERSION)
            .header("x-ms-blob-type", "BlockBlob")
            .header("x-ms-blob-content-type", REPORT_CONTENT_TYPE)
            .header("content-type", REPORT_CONTENT_TYPE)
            .body(body.to_string())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(CloudError::Status {
                status: status.as_u16(),
                endpoint: url.path().to_string(),
                body: text,
            });
        }

        info!(container = REPORT_CONTAINER, blob = %name, "Report stored");
        Ok(())
    }
}

//! Logic App notification sink
//!
//! Posts the rendered report body to a Logic App HTTP trigger, which
//! forwards it to the operator by email.

use super::{CloudError, NotificationSink};
use async_trait::async_trait;
use serde::Serialize;
use tracing::info;
use url::Url;

#[derive(Debug, Serialize)]
struct NotificationPayload<'a> {
    email: &'a str,
    body: &'a str,
}

/// Notification sink backed by a Logic App HTTP trigger
pub struct LogicAppNotifier {
    http: reqwest::Client,
    endpoint: Url,
}

impl LogicAppNotifier {
    pub fn new(http: reqwest::Client, endpoint: &str) -> Result<Self, CloudError> {
        let endpoint = Url::parse(endpoint).map_err(|e| CloudError::Endpoint(e.to_string()))?;
        Ok(Self { http, endpoint })
    }
}

#[async_trait]
impl NotificationSink for LogicAppNotifier {
    async fn send(&self, recipient: &str, body: &str) -> Result<(), CloudError> {
        let payload = NotificationPayload {
            email: recipient,
            body,
        };

        let response = self
            .http
            .post(self.endpoint.clone())
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(CloudError::Status {
                status: status.as_u16(),
                endpoint: self.endpoint.path().to_string(),
                body: text,
            });
        }

        info!(recipient = %recipient, "Notification dispatched");
        Ok(())
    }
}

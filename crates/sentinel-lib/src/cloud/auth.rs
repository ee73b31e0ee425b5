//! Bearer-token acquisition via Azure managed identity
//!
//! Tokens are fetched from the instance metadata service and cached
//! per scope until shortly before expiry.

use super::CloudError;
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

/// Token audience for Azure Resource Manager
pub const MANAGEMENT_SCOPE: &str = "https://management.azure.com/";

/// Token audience for Azure Storage
pub const STORAGE_SCOPE: &str = "https://storage.azure.com/";

/// Instance metadata service token endpoint
const IMDS_TOKEN_ENDPOINT: &str = "http://169.254.169.254/metadata/identity/oauth2/token";

/// IMDS identity API version
const IMDS_API_VERSION: &str = "2018-02-01";

/// Refresh a cached token this long before it expires
const EXPIRY_MARGIN_SECS: i64 = 5 * 60;

/// Provider of bearer tokens for a resource scope
#[async_trait]
pub trait TokenCredential: Send + Sync {
    /// Return a valid access token for the given scope
    async fn token(&self, scope: &str) -> Result<String, CloudError>;
}

#[derive(Debug, Deserialize)]
struct ImdsTokenResponse {
    access_token: String,
    /// Unix epoch seconds, returned as a string by IMDS
    expires_on: String,
}

#[derive(Debug, Clone)]
struct CachedToken {
    token: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn is_fresh(&self) -> bool {
        Utc::now() + chrono::Duration::seconds(EXPIRY_MARGIN_SECS) < self.expires_at
    }
}

/// Managed-identity credential backed by the instance metadata service
pub struct ManagedIdentityCredential {
    http: reqwest::Client,
    endpoint: String,
    cache: RwLock<HashMap<String, CachedToken>>,
}

impl ManagedIdentityCredential {
    pub fn new(http: reqwest::Client) -> Self {
        Self {
            http,
            endpoint: IMDS_TOKEN_ENDPOINT.to_string(),
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Override the metadata endpoint (used by tests)
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    async fn fetch(&self, scope: &str) -> Result<CachedToken, CloudError> {
        let response = self
            .http
            .get(&self.endpoint)
            .query(&[("api-version", IMDS_API_VERSION), ("resource", scope)])
            .header("Metadata", "true")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CloudError::Auth(format!(
                "token endpoint returned {}: {}",
                status, body
            )));
        }

        let token: ImdsTokenResponse = response
            .json()
            .await
            .map_err(|e| CloudError::Auth(format!("invalid token response: {}", e)))?;

        let expires_on: i64 = token
            .expires_on
            .parse()
            .map_err(|_| CloudError::Auth("non-numeric expires_on in token response".into()))?;
        let expires_at = Utc
            .timestamp_opt(expires_on, 0)
            .single()
            .ok_or_else(|| CloudError::Auth("out-of-range expires_on in token response".into()))?;

        debug!(scope = %scope, expires_at = %expires_at, "Acquired access token");

        Ok(CachedToken {
            token: token.access_token,
            expires_at,
        })
    }
}

#[async_trait]
impl TokenCredential for ManagedIdentityCredential {
    async fn token(&self, scope: &str) -> Result<String, CloudError> {
        {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.get(scope) {
                if cached.is_fresh() {
                    return Ok(cached.token.clone());
                }
            }
        }

        let fetched = self.fetch(scope).await?;
        let token = fetched.token.clone();
        self.cache.write().await.insert(scope.to_string(), fetched);
        Ok(token)
    }
}

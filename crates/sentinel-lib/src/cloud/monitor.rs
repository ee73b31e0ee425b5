//! Azure Monitor metrics client
//!
//! Queries per-period platform-metric aggregates for a single resource.

use super::{CloudError, MetricQuery, MetricsSource, TokenCredential, MANAGEMENT_SCOPE};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;
use url::Url;

/// Default ARM endpoint (metrics are served under the management plane)
const ARM_ENDPOINT: &str = "https://management.azure.com";

/// Metrics API version
const METRICS_API_VERSION: &str = "2018-01-01";

/// Timespan timestamp format accepted by the metrics endpoint
const TIMESPAN_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

#[derive(Debug, Deserialize)]
struct MetricsResponse {
    #[serde(default)]
    value: Vec<Metric>,
}

#[derive(Debug, Deserialize)]
struct Metric {
    #[serde(default)]
    timeseries: Vec<TimeSeries>,
}

#[derive(Debug, Deserialize)]
struct TimeSeries {
    #[serde(default)]
    data: Vec<MetricSample>,
}

#[derive(Debug, Deserialize)]
struct MetricSample {
    average: Option<f64>,
}

/// Metrics source backed by the Azure Monitor REST API
pub struct MonitorMetricsSource {
    http: reqwest::Client,
    base: Url,
    credential: Arc<dyn TokenCredential>,
}

impl MonitorMetricsSource {
    pub fn new(
        http: reqwest::Client,
        credential: Arc<dyn TokenCredential>,
    ) -> Result<Self, CloudError> {
        Self::with_endpoint(http, ARM_ENDPOINT, credential)
    }

    /// Construct against a non-default endpoint (used by tests)
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

    fn timespan(end: DateTime<Utc>, lookback: chrono::Duration) -> String {
        let start = end - lookback;
        format!(
            "{}/{}",
            start.format(TIMESPAN_FORMAT),
            end.format(TIMESPAN_FORMAT)
        )
    }
}

#[async_trait]
impl MetricsSource for MonitorMetricsSource {
    async fn query(
        &self,
        resource_id: &str,
        query: &MetricQuery,
    ) -> Result<Vec<Option<f64>>, CloudError> {
        let mut url = self
            .base
            .join(&format!("{}/providers/Microsoft.Insights/metrics", resource_id))
            .map_err(|e| CloudError::Endpoint(e.to_string()))?;
        url.query_pairs_mut()
            .append_pair("api-version", METRICS_API_VERSION)
            .append_pair("timespan", &Self::timespan(Utc::now(), query.lookback))
            .append_pair("interval", query.interval)
            .append_pair("metricnames", query.metric)
            .append_pair("aggregation", query.aggregation);

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

        let metrics: MetricsResponse = response
            .json()
            .await
            .map_err(|e| CloudError::Decode(e.to_string()))?;

        let samples: Vec<Option<f64>> = metrics
            .value
            .first()
            .and_then(|metric| metric.timeseries.first())
            .map(|series| series.data.iter().map(|sample| sample.average).collect())
            .unwrap_or_default();

        debug!(
            resource_id = %resource_id,
            periods = samples.len(),
            "Fetched metric series"
        );
        Ok(samples)
    }
}

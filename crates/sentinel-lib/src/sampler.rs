//! Windowed metric sampling
//!
//! Computes the average CPU utilization of a resource over a fixed
//! lookback window, averaging only the periods that carry data.

use crate::cloud::{CloudError, MetricQuery, MetricsSource};
use std::sync::Arc;

/// Lookback window for idleness evaluation
pub const LOOKBACK_DAYS: i64 = 7;

/// Per-sample bucket size, one day
pub const SAMPLE_INTERVAL: &str = "P1D";

/// Metric queried for idleness evaluation
pub const CPU_METRIC: &str = "Percentage CPU";

/// Mean of the available samples in a series.
///
/// Missing periods are excluded from numerator and denominator; a
/// series with no available samples (including the empty series) has
/// no mean.
pub fn mean_of_available(samples: &[Option<f64>]) -> Option<f64> {
    let available: Vec<f64> = samples.iter().copied().flatten().collect();
    if available.is_empty() {
        return None;
    }
    Some(available.iter().sum::<f64>() / available.len() as f64)
}

/// Samples the windowed average CPU of a single resource
#[derive(Clone)]
pub struct MetricSampler {
    source: Arc<dyn MetricsSource>,
}

impl MetricSampler {
    pub fn new(source: Arc<dyn MetricsSource>) -> Self {
        Self { source }
    }

    fn query() -> MetricQuery {
        MetricQuery {
            metric: CPU_METRIC,
            aggregation: "Average",
            lookback: chrono::Duration::days(LOOKBACK_DAYS),
            interval: SAMPLE_INTERVAL,
        }
    }

    /// Average CPU percentage over the lookback window, or `None` when
    /// the backend returned no data for it. Backend failures propagate
    /// to the caller, which treats them as "cannot evaluate idleness".
    pub async fn average_cpu(&self, resource_id: &str) -> Result<Option<f64>, CloudError> {
        let samples = self.source.query(resource_id, &Self::query()).await?;
        Ok(mean_of_available(&samples))
    }
}

use mcol_domain::error::{Error, Result};
use mcol_domain::{MetricBatch, MetricKind, MetricValue, Metrics};

use crate::v1;

impl From<&Metrics> for v1::Metric {
    fn from(metric: &Metrics) -> Self {
        Self {
            id: metric.id.clone(),
            m_type: metric.kind.as_str().to_string(),
            delta: metric.delta.unwrap_or_default(),
            value: metric.value.unwrap_or_default(),
            hash: metric.hash.clone().unwrap_or_default(),
        }
    }
}

impl From<&MetricBatch> for v1::UpdateMetricsRequest {
    fn from(batch: &MetricBatch) -> Self {
        Self {
            metrics: batch.iter().map(v1::Metric::from).collect(),
        }
    }
}

impl TryFrom<v1::Metric> for Metrics {
    type Error = Error;

    /// Only the field matching the type is kept; an empty hash means none
    fn try_from(message: v1::Metric) -> Result<Self> {
        let kind: MetricKind = message.m_type.parse()?;
        let metric = match kind {
            MetricKind::Counter => Metrics::counter(message.id, message.delta),
            MetricKind::Gauge => Metrics::gauge(message.id, message.value),
        };
        Ok(if message.hash.is_empty() {
            metric
        } else {
            metric.with_hash(message.hash)
        })
    }
}

impl From<MetricValue> for v1::GetMetricValueResponse {
    fn from(value: MetricValue) -> Self {
        match value {
            MetricValue::Counter(delta) => Self { delta, value: 0.0 },
            MetricValue::Gauge(value) => Self { delta: 0, value },
        }
    }
}

/// Convert every message of a batch request, failing on the first bad one
pub fn batch_from_request(request: v1::UpdateMetricsRequest) -> Result<Vec<Metrics>> {
    request.metrics.into_iter().map(Metrics::try_from).collect()
}

impl v1::StdResponse {
    /// Successful write
    pub fn ok() -> Self {
        Self::default()
    }

    /// Failed write carrying `error`
    pub fn failed(error: impl ToString) -> Self {
        Self {
            error: error.to_string(),
        }
    }

    /// `Err` when the server reported an error string
    pub fn into_result(self) -> Result<()> {
        if self.error.is_empty() {
            Ok(())
        } else {
            Err(Error::network(format!("Server rejected metrics: {}", self.error)))
        }
    }
}

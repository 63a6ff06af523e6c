//! Wire representation of metrics
//!
//! `Metrics` is the JSON object exchanged between agent and server:
//! `{"id": .., "type": .., "delta": .., "value": .., "hash": ..}`.

use serde::{Deserialize, Serialize};

use crate::constants::GAUGE_HASH_PRECISION;
use crate::entities::{MetricKind, MetricValue};
use crate::error::{Error, Result};

/// One metric on the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    /// Metric name
    pub id: String,
    /// Metric kind
    #[serde(rename = "type")]
    pub kind: MetricKind,
    /// Counter increment; set only for counters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delta: Option<i64>,
    /// Gauge value; set only for gauges
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    /// Hex HMAC-SHA256 of the canonical form, when a key is configured
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
}

impl Metrics {
    /// Counter carrying an increment
    pub fn counter<S: Into<String>>(id: S, delta: i64) -> Self {
        Self {
            id: id.into(),
            kind: MetricKind::Counter,
            delta: Some(delta),
            value: None,
            hash: None,
        }
    }

    /// Gauge carrying a value
    pub fn gauge<S: Into<String>>(id: S, value: f64) -> Self {
        Self {
            id: id.into(),
            kind: MetricKind::Gauge,
            delta: None,
            value: Some(value),
            hash: None,
        }
    }

    /// Lookup request with no numeric payload
    pub fn query<S: Into<String>>(id: S, kind: MetricKind) -> Self {
        Self {
            id: id.into(),
            kind,
            delta: None,
            value: None,
            hash: None,
        }
    }

    /// Build the wire form of a stored value
    pub fn from_value<S: Into<String>>(id: S, value: MetricValue) -> Self {
        match value {
            MetricValue::Counter(delta) => Self::counter(id, delta),
            MetricValue::Gauge(value) => Self::gauge(id, value),
        }
    }

    /// Attach a hash
    #[must_use]
    pub fn with_hash<S: Into<String>>(mut self, hash: S) -> Self {
        self.hash = Some(hash.into());
        self
    }

    /// The numeric field that is active for this kind
    pub fn numeric(&self) -> Result<MetricValue> {
        match self.kind {
            MetricKind::Counter => self.delta.map(MetricValue::Counter).ok_or_else(|| {
                Error::invalid_argument(format!("counter {} has no delta", self.id))
            }),
            MetricKind::Gauge => self
                .value
                .filter(|v| v.is_finite())
                .map(MetricValue::Gauge)
                .ok_or_else(|| Error::invalid_argument(format!("gauge {} has no value", self.id))),
        }
    }

    /// Shape check applied before a metric is stored
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(Error::invalid_argument("metric id must not be empty"));
        }
        self.numeric().map(|_| ())
    }

    /// Canonical string fed to the HMAC: `id:counter:delta` or `id:gauge:value`
    pub fn canonical_form(&self) -> Result<String> {
        Ok(match self.numeric()? {
            MetricValue::Counter(delta) => format!("{}:{}:{delta}", self.id, self.kind),
            MetricValue::Gauge(value) => {
                format!("{}:{}:{value:.prec$}", self.id, self.kind, prec = GAUGE_HASH_PRECISION)
            }
        })
    }
}

/// Ordered, immutable collection of metrics sent in one request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetricBatch(Vec<Metrics>);

impl MetricBatch {
    /// Wrap an ordered list of metrics
    pub fn new(metrics: Vec<Metrics>) -> Self {
        Self(metrics)
    }

    /// Number of metrics in the batch
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the batch is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate in order
    pub fn iter(&self) -> std::slice::Iter<'_, Metrics> {
        self.0.iter()
    }

    /// Borrow as a slice
    pub fn as_slice(&self) -> &[Metrics] {
        &self.0
    }

    /// Take the metrics out
    pub fn into_inner(self) -> Vec<Metrics> {
        self.0
    }
}

impl From<Vec<Metrics>> for MetricBatch {
    fn from(metrics: Vec<Metrics>) -> Self {
        Self(metrics)
    }
}

impl<'a> IntoIterator for &'a MetricBatch {
    type Item = &'a Metrics;
    type IntoIter = std::slice::Iter<'a, Metrics>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

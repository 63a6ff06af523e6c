//! Metric entity
//!
//! A live metric owned by the agent between sampling ticks. It remembers the
//! previous reading so the change since the last tick can be reported.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::{COUNTER_TYPE, GAUGE_DISPLAY_PRECISION, GAUGE_TYPE};
use crate::error::{Error, Result};
use crate::value_objects::Metrics;

/// The two disjoint metric namespaces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
    /// Accumulating metric; writes add to the stored total
    Counter,
    /// Point-in-time metric; writes replace the stored value
    Gauge,
}

impl MetricKind {
    /// Wire name (`counter` / `gauge`)
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Counter => COUNTER_TYPE,
            Self::Gauge => GAUGE_TYPE,
        }
    }

    /// Capitalised name used in human facing messages
    pub fn label(self) -> &'static str {
        match self {
            Self::Counter => "Counter",
            Self::Gauge => "Gauge",
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            COUNTER_TYPE => Ok(Self::Counter),
            GAUGE_TYPE => Ok(Self::Gauge),
            other => Err(Error::unsupported(format!("{other} is not a metric type"))),
        }
    }
}

/// Numeric payload of a metric, tagged by kind
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MetricValue {
    /// Integer counter value
    Counter(i64),
    /// Floating point gauge value
    Gauge(f64),
}

impl MetricValue {
    /// Zero of the given kind
    pub fn zero(kind: MetricKind) -> Self {
        match kind {
            MetricKind::Counter => Self::Counter(0),
            MetricKind::Gauge => Self::Gauge(0.0),
        }
    }

    /// Kind of this value
    pub fn kind(&self) -> MetricKind {
        match self {
            Self::Counter(_) => MetricKind::Counter,
            Self::Gauge(_) => MetricKind::Gauge,
        }
    }

    /// Value as an integer; gauges are truncated
    pub fn as_i64(&self) -> i64 {
        match *self {
            Self::Counter(v) => v,
            Self::Gauge(v) => v as i64,
        }
    }

    /// Value as a float
    pub fn as_f64(&self) -> f64 {
        match *self {
            Self::Counter(v) => v as f64,
            Self::Gauge(v) => v,
        }
    }

    /// Convert to the given kind, keeping the numeric magnitude
    pub fn coerce(self, kind: MetricKind) -> Self {
        match kind {
            MetricKind::Counter => Self::Counter(self.as_i64()),
            MetricKind::Gauge => Self::Gauge(self.as_f64()),
        }
    }

    /// `self - earlier`, in the kind of `self`
    pub fn difference(self, earlier: Self) -> Self {
        match self {
            Self::Counter(v) => Self::Counter(v.wrapping_sub(earlier.as_i64())),
            Self::Gauge(v) => Self::Gauge(v - earlier.as_f64()),
        }
    }

    /// Parse a textual value for the given kind
    ///
    /// Error messages match the ones returned to HTTP clients.
    pub fn parse(kind: MetricKind, raw: &str) -> Result<Self> {
        match kind {
            MetricKind::Counter => raw
                .trim()
                .parse::<i64>()
                .map(Self::Counter)
                .map_err(|_| Error::invalid_argument("Metric must be int!")),
            MetricKind::Gauge => raw
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .map(Self::Gauge)
                .ok_or_else(|| Error::invalid_argument("Metric must be float!")),
        }
    }
}

impl fmt::Display for MetricValue {
    /// Counters print as integers, gauges with three decimals
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Counter(v) => write!(f, "{v}"),
            Self::Gauge(v) => write!(f, "{v:.GAUGE_DISPLAY_PRECISION$}"),
        }
    }
}

/// A named metric with its current, previous and delta values
#[derive(Debug, Clone, PartialEq)]
pub struct Metric {
    name: String,
    value: MetricValue,
    previous: MetricValue,
    delta: MetricValue,
}

impl Metric {
    /// Create a metric from its first reading; the delta equals the reading
    pub fn new<S: Into<String>>(name: S, initial: MetricValue) -> Self {
        let previous = MetricValue::zero(initial.kind());
        Self {
            name: name.into(),
            value: initial,
            previous,
            delta: initial.difference(previous),
        }
    }

    /// Counter with an initial value
    pub fn counter<S: Into<String>>(name: S, value: i64) -> Self {
        Self::new(name, MetricValue::Counter(value))
    }

    /// Gauge with an initial value
    pub fn gauge<S: Into<String>>(name: S, value: f64) -> Self {
        Self::new(name, MetricValue::Gauge(value))
    }

    /// Metric name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Metric kind
    pub fn kind(&self) -> MetricKind {
        self.value.kind()
    }

    /// Latest reading
    pub fn value(&self) -> MetricValue {
        self.value
    }

    /// Reading before the latest update
    pub fn previous(&self) -> MetricValue {
        self.previous
    }

    /// `value - previous`
    pub fn delta(&self) -> MetricValue {
        self.delta
    }

    /// Record a new reading, shifting the current value into `previous`
    pub fn observe(&mut self, reading: MetricValue) {
        let reading = reading.coerce(self.kind());
        self.previous = self.value;
        self.value = reading;
        self.delta = self.value.difference(self.previous);
    }

    /// Wire form: counters carry their delta, gauges their current value
    pub fn to_wire(&self) -> Metrics {
        match (self.value, self.delta) {
            (MetricValue::Counter(_), delta) => Metrics::counter(&self.name, delta.as_i64()),
            (MetricValue::Gauge(value), _) => Metrics::gauge(&self.name, value),
        }
    }
}

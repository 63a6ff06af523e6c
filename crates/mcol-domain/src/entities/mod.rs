//! Domain entities

/// Metric entity and its numeric value
pub mod metric;

pub use metric::{Metric, MetricKind, MetricValue};

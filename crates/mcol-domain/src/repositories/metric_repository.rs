//! Metric Repository Interface
//!
//! One capability set shared by the in-memory engine and the relational
//! engine. The backend is chosen once at startup and used as a trait object.

use std::sync::Arc;

use async_trait::async_trait;

use crate::entities::{MetricKind, MetricValue};
use crate::error::Result;
use crate::value_objects::{MetricListing, Metrics};

/// Repository: metric storage
///
/// Counters accumulate (`total += delta`), gauges are replaced. Records are
/// never deleted while the process runs.
///
/// # Example
///
/// ```ignore
/// use mcol_domain::repositories::MetricRepository;
///
/// repo.insert_counter("PollCount", 4).await?;
/// repo.insert_counter("PollCount", 4).await?;
/// assert_eq!(repo.counter_value("PollCount").await?, Some(8));
/// ```
#[async_trait]
pub trait MetricRepository: Send + Sync {
    /// Add `delta` to the counter `name`, creating it at zero if missing
    async fn insert_counter(&self, name: &str, delta: i64) -> Result<()>;

    /// Replace the gauge `name` with `value`
    async fn insert_gauge(&self, name: &str, value: f64) -> Result<()>;

    /// Current counter total, `None` when the name is unknown
    async fn counter_value(&self, name: &str) -> Result<Option<i64>>;

    /// Current gauge value, `None` when the name is unknown
    async fn gauge_value(&self, name: &str) -> Result<Option<f64>>;

    /// Stored value in the given namespace
    async fn value_of(&self, kind: MetricKind, name: &str) -> Result<Option<MetricValue>> {
        Ok(match kind {
            MetricKind::Counter => self.counter_value(name).await?.map(MetricValue::Counter),
            MetricKind::Gauge => self.gauge_value(name).await?.map(MetricValue::Gauge),
        })
    }

    /// Whether `name` exists in the given namespace
    async fn exists(&self, kind: MetricKind, name: &str) -> Result<bool> {
        Ok(self.value_of(kind, name).await?.is_some())
    }

    /// Every stored metric
    async fn list_all(&self) -> Result<MetricListing>;

    /// Apply a validated batch as one logical unit
    ///
    /// Implementations either apply every entry or none of them.
    async fn batch_insert(&self, batch: &[Metrics]) -> Result<()>;

    /// Persist the whole state, when the backend supports snapshots
    async fn dump(&self) -> Result<()>;

    /// Replace the whole state from the last snapshot
    async fn restore(&self) -> Result<()>;

    /// Health check against the backing store
    async fn ping(&self) -> Result<()>;

    /// Flush and release the backend
    async fn close(&self) -> Result<()>;

    /// Short backend identifier used in logs
    fn backend_name(&self) -> &str;
}

/// Shared repository handle
pub type SharedRepository = Arc<dyn MetricRepository>;

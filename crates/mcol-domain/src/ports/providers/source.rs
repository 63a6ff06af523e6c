//! Metric Source Port
//!
//! A sampler producing named readings. Sources must tolerate an unavailable
//! reading by reporting zero for it rather than failing the whole read.

use async_trait::async_trait;

use crate::entities::MetricValue;
use crate::error::Result;

/// Named readings in a stable order
pub type Readings = Vec<(String, MetricValue)>;

/// Producer of a fixed set of metrics
#[async_trait]
pub trait MetricSource: Send + Sync {
    /// Source identifier used in logs
    fn name(&self) -> &str;

    /// Read every metric this source knows about
    async fn read(&self) -> Result<Readings>;
}

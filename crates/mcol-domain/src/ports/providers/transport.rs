//! Metric Transport Port
//!
//! Delivers one batch to the collector. A batch is atomic for retry purposes:
//! implementations never send part of it.

use async_trait::async_trait;

use crate::error::Result;
use crate::value_objects::MetricBatch;

/// Agent side of the wire
#[async_trait]
pub trait MetricTransport: Send + Sync {
    /// Send the batch; any marshal, connection or status failure is an error
    async fn send(&self, batch: &MetricBatch) -> Result<()>;

    /// Protocol name used in logs
    fn protocol(&self) -> &str;
}

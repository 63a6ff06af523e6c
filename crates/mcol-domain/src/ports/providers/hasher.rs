//! Metric Hasher Port
//!
//! Signs and verifies single metrics with a shared secret. The keyed
//! implementation lives in mcol-infrastructure.

use crate::error::Result;
use crate::value_objects::Metrics;

/// Integrity hashing for wire metrics
pub trait MetricHasher: Send + Sync {
    /// Hash of the metric's canonical form
    fn sign(&self, metric: &Metrics) -> Result<String>;

    /// Check the metric's own hash; a missing hash is a mismatch
    fn verify(&self, metric: &Metrics) -> Result<()>;

    /// Return a copy of `metric` carrying its hash
    fn signed(&self, metric: &Metrics) -> Result<Metrics> {
        let hash = self.sign(metric)?;
        Ok(metric.clone().with_hash(hash))
    }
}

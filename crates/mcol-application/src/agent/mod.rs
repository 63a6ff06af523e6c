//! Agent side orchestration

/// Bounded linear retry
pub mod backoff;
/// Sample merging
pub mod fan_in;
/// Collect/update/send pipeline
pub mod pipeline;

pub use backoff::{RetryPolicy, retry_with_backoff};
pub use fan_in::{SampleResult, fan_in};
pub use pipeline::{AgentSettings, MetricAgent};

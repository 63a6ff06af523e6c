//! Application layer for the metric collector
//!
//! Orchestrates the domain ports: the server side ingestion use case and the
//! agent side collect/update/send pipeline.

/// Agent pipeline, backoff and fan-in
pub mod agent;
/// Server use cases
pub mod use_cases;

pub use agent::{AgentSettings, MetricAgent, RetryPolicy, retry_with_backoff};
pub use use_cases::IngestionService;

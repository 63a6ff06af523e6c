//! Repository interfaces
//!
//! Storage contracts implemented by the providers crate.

/// Metric storage contract
pub mod metric_repository;

pub use metric_repository::{MetricRepository, SharedRepository};

//! Domain Port Interfaces
//!
//! Boundary contracts between the domain and the outer layers. Traits live
//! here; implementations live in the infrastructure and providers crates.

/// External service provider ports
pub mod providers;

pub use providers::{MetricHasher, MetricSource, MetricTransport, Readings};

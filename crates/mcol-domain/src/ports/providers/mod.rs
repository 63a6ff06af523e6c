//! Provider ports

/// Metric integrity hashing
pub mod hasher;
/// Metric sampling sources
pub mod source;
/// Agent to server transports
pub mod transport;

pub use hasher::MetricHasher;
pub use source::{MetricSource, Readings};
pub use transport::MetricTransport;

//! Domain layer for the metric collector
//!
//! Holds the metric model, the JSON wire format, the error type and the
//! ports implemented by the outer layers. Nothing here performs I/O.

/// Shared names and formats
pub mod constants;
/// Domain entities
pub mod entities;
/// Error handling types
pub mod error;
/// Port traits for providers
pub mod ports;
/// Repository traits
pub mod repositories;
/// Value objects
pub mod value_objects;

pub use entities::{Metric, MetricKind, MetricValue};
pub use error::{Error, Result};
pub use value_objects::{MetricBatch, MetricListing, Metrics};

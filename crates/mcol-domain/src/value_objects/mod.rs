//! Value objects exchanged between layers

/// Stored metric listing
pub mod listing;
/// JSON wire format
pub mod wire;

pub use listing::MetricListing;
pub use wire::{MetricBatch, Metrics};

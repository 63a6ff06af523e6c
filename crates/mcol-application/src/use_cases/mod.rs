//! Use cases

/// Metric ingestion and lookup
pub mod ingestion;

pub use ingestion::IngestionService;

//! Payload codecs shared by the agent transports and the collector

/// Content-Encoding framing
pub mod envelope;
/// Gzip helpers
pub mod gzip;

pub use envelope::{ContentEncoding, Envelope, open, seal};

//! Configuration module
//!
//! Typed settings for the agent and the server, and the layered loader that
//! builds them.

/// Serde adapter for humantime durations
pub mod duration;
/// Layered loader
pub mod loader;
/// Settings types
pub mod types;

pub use loader::{ConfigLoader, LoadableConfig};
pub use types::{AgentConfig, LoggingConfig, Protocol, ServerConfig};

//! Configuration types module

pub mod agent;
pub mod logging;
pub mod server;

pub use agent::{AgentConfig, Protocol};
pub use logging::LoggingConfig;
pub use server::ServerConfig;

/// Treat empty strings from flags or env as unset
pub(crate) fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

//! Infrastructure layer constants
//!
//! Contains constants that are part of the infrastructure implementation.
//! Domain-specific constants are defined in `mcol_domain::constants`.

// ============================================================================
// CONFIGURATION CONSTANTS
// ============================================================================

/// Environment variable prefix for server configuration (`MCOL_SERVER__ADDRESS`)
pub const SERVER_ENV_PREFIX: &str = "MCOL_SERVER__";

/// Environment variable prefix for agent configuration (`MCOL_AGENT__POLL_INTERVAL`)
pub const AGENT_ENV_PREFIX: &str = "MCOL_AGENT__";

/// Separator for nested keys in prefixed environment variables
pub const ENV_NESTING_SEPARATOR: &str = "__";

/// Environment variable overriding the log filter
pub const LOG_FILTER_ENV: &str = "MCOL_LOG";

/// Default log level
pub const DEFAULT_LOG_LEVEL: &str = "info";

// ============================================================================
// AGENT DEFAULTS
// ============================================================================

/// Default collector HTTP address used by the agent
pub const DEFAULT_AGENT_ADDRESS: &str = "127.0.0.1:8080";

/// Default collector RPC address used by the agent
pub const DEFAULT_AGENT_GRPC_ADDRESS: &str = "localhost:8082";

/// Default poll interval in seconds
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 2;

/// Default report interval in seconds
pub const DEFAULT_REPORT_INTERVAL_SECS: u64 = 10;

/// Default number of send attempts
pub const DEFAULT_RETRIES: u32 = 3;

/// Default base retry delay in seconds
pub const DEFAULT_RETRY_DELAY_SECS: u64 = 10;

/// Default per-request timeout in seconds
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 5;

// ============================================================================
// SERVER DEFAULTS
// ============================================================================

/// Default HTTP listen address
pub const DEFAULT_SERVER_ADDRESS: &str = "localhost:8080";

/// Default snapshot interval in seconds
pub const DEFAULT_STORE_INTERVAL_SECS: u64 = 300;

/// Default snapshot file
pub const DEFAULT_STORE_FILE: &str = "/tmp/devops-metrics-db.json";

/// Bound of the relational engine's per-query timeout in seconds
pub const DATABASE_QUERY_TIMEOUT_SECS: u64 = 5;

/// Grace period for background tasks on shutdown in seconds
pub const SHUTDOWN_GRACE_SECS: u64 = 10;

// ============================================================================
// CRYPTO CONSTANTS
// ============================================================================

/// Bytes reserved by OAEP padding with SHA-256 (`2 * 32 + 2`)
pub const OAEP_SHA256_OVERHEAD: usize = 66;

/// Address probed to discover the outbound interface; no packet is sent
pub const OUTBOUND_PROBE_ADDRESS: &str = "8.8.8.8:80";

//! Provider constants

/// Bound of the in-memory change notification channel
pub const CHANGE_CHANNEL_CAPACITY: usize = 64;

/// Suffix of the temporary file a snapshot is written to before the rename
pub const SNAPSHOT_TEMP_SUFFIX: &str = ".tmp";

/// Per-statement timeout installed on every database connection
pub const STATEMENT_TIMEOUT_OPTION: &str = "-c statement_timeout=5000";

/// Upper bound of pooled database connections
pub const DATABASE_POOL_SIZE: u32 = 8;

/// HTTP path of the batch endpoint
pub const BATCH_UPDATE_PATH: &str = "/updates/";

/// HTTP content type of metric payloads
pub const CONTENT_TYPE_JSON: &str = "application/json";

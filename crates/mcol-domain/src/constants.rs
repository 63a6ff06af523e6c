//! Domain layer constants
//!
//! Names and formats shared by every component that produces or consumes metrics.

/// Wire name of the counter metric kind
pub const COUNTER_TYPE: &str = "counter";

/// Wire name of the gauge metric kind
pub const GAUGE_TYPE: &str = "gauge";

/// Number of fractional digits used when rendering gauge values for humans
pub const GAUGE_DISPLAY_PRECISION: usize = 3;

/// Number of fractional digits used when rendering gauge values for hashing
pub const GAUGE_HASH_PRECISION: usize = 6;

/// Header carrying the caller's self-reported address
pub const REAL_IP_HEADER: &str = "X-Real-IP";

/// Content encoding announced for RSA-encrypted, base64-wrapped payloads
pub const ENCRYPTED_CONTENT_ENCODING: &str = "64base";

/// Content encoding announced for gzip payloads
pub const GZIP_CONTENT_ENCODING: &str = "gzip";

/// Counter incremented by one on every agent poll
pub const POLL_COUNT_METRIC: &str = "PollCount";

/// Gauge sampled from a uniform random source on every agent poll
pub const RANDOM_VALUE_METRIC: &str = "RandomValue";

//! Agent configuration types

use std::path::{Path, PathBuf};
use std::time::Duration;

use mcol_application::{AgentSettings, RetryPolicy};
use mcol_domain::error::{Error, Result};
use serde::{Deserialize, Serialize};

use super::{LoggingConfig, non_empty};
use crate::config::LoadableConfig;
use crate::constants::*;

/// Wire protocol used by the agent
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    /// JSON over HTTP, gzip or RSA framed
    #[default]
    Http,
    /// Unary RPC over HTTP/2
    Grpc,
}

impl Protocol {
    /// Name used in logs
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Grpc => "grpc",
        }
    }
}

/// Agent configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Collector HTTP address (`host:port`)
    pub address: String,

    /// Collector RPC address (`host:port`)
    pub grpc_address: String,

    /// Transport selection
    pub protocol: Protocol,

    /// Period of the update phase
    #[serde(with = "crate::config::duration")]
    pub poll_interval: Duration,

    /// Period of the send phase
    #[serde(with = "crate::config::duration")]
    pub report_interval: Duration,

    /// Send attempts per report
    pub retries: u32,

    /// Base pause between attempts, multiplied by the attempt number
    #[serde(with = "crate::config::duration")]
    pub retry_delay: Duration,

    /// Timeout of one HTTP request or RPC call
    #[serde(with = "crate::config::duration")]
    pub request_timeout: Duration,

    /// Shared HMAC key; metrics are signed when set
    pub key: Option<String>,

    /// PEM public key; HTTP payloads are encrypted when set
    pub crypto_key: Option<PathBuf>,

    /// Logging settings
    pub logging: LoggingConfig,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_AGENT_ADDRESS.to_string(),
            grpc_address: DEFAULT_AGENT_GRPC_ADDRESS.to_string(),
            protocol: Protocol::default(),
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            report_interval: Duration::from_secs(DEFAULT_REPORT_INTERVAL_SECS),
            retries: DEFAULT_RETRIES,
            retry_delay: Duration::from_secs(DEFAULT_RETRY_DELAY_SECS),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            key: None,
            crypto_key: None,
            logging: LoggingConfig::default(),
        }
    }
}

impl AgentConfig {
    /// Signing key, ignoring an empty value
    pub fn signing_key(&self) -> Option<&str> {
        non_empty(self.key.as_deref())
    }

    /// Public key path, ignoring an empty value
    pub fn crypto_key_path(&self) -> Option<&Path> {
        self.crypto_key
            .as_deref()
            .filter(|p| !p.as_os_str().is_empty())
    }

    /// Timing knobs of the agent pipeline
    pub fn agent_settings(&self) -> AgentSettings {
        AgentSettings {
            poll_interval: self.poll_interval,
            report_interval: self.report_interval,
            retry: RetryPolicy::new(self.retries, self.retry_delay),
        }
    }
}

impl LoadableConfig for AgentConfig {
    const ENV_PREFIX: &'static str = AGENT_ENV_PREFIX;

    const LEGACY_ENV: &'static [(&'static str, &'static str)] = &[
        ("ADDRESS", "address"),
        ("ADDRESS_GRPC", "grpc_address"),
        ("PROTOCOL", "protocol"),
        ("POLL_INTERVAL", "poll_interval"),
        ("REPORT_INTERVAL", "report_interval"),
        ("BACKOFF_RETRIES", "retries"),
        ("BACKOFF_DELAY", "retry_delay"),
        ("KEY", "key"),
        ("CRYPTO_KEY", "crypto_key"),
    ];

    fn validate(&self) -> Result<()> {
        if self.poll_interval.is_zero() {
            return Err(Error::configuration("Poll interval cannot be 0"));
        }
        if self.report_interval.is_zero() {
            return Err(Error::configuration("Report interval cannot be 0"));
        }
        if self.retries == 0 {
            return Err(Error::configuration("Retries cannot be 0"));
        }
        let address = match self.protocol {
            Protocol::Http => &self.address,
            Protocol::Grpc => &self.grpc_address,
        };
        if address.trim().is_empty() {
            return Err(Error::configuration(format!(
                "Address for protocol {} cannot be empty",
                self.protocol.as_str()
            )));
        }
        Ok(())
    }
}

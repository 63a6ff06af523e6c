//! Server configuration types

use std::path::{Path, PathBuf};
use std::time::Duration;

use mcol_domain::error::{Error, Result};
use serde::{Deserialize, Serialize};

use super::{LoggingConfig, non_empty};
use crate::config::LoadableConfig;
use crate::constants::*;
use crate::net::TrustedSubnet;

/// Server configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// HTTP listen address (`host:port`)
    pub address: String,

    /// RPC listen address; the RPC service is disabled when unset
    pub grpc_address: Option<String>,

    /// Snapshot period; zero rewrites the snapshot on every write
    #[serde(with = "crate::config::duration")]
    pub store_interval: Duration,

    /// Snapshot file of the in-memory engine; snapshots are disabled when unset
    pub store_file: Option<PathBuf>,

    /// Load the snapshot on start
    pub restore: bool,

    /// Shared HMAC key; writes must carry a valid hash when set
    pub key: Option<String>,

    /// PEM private key; `64base` payloads are accepted when set
    pub crypto_key: Option<PathBuf>,

    /// PostgreSQL DSN; selects the relational engine when set
    pub database_dsn: Option<String>,

    /// CIDR allowed to write; every caller may write when unset
    pub trusted_subnet: Option<String>,

    /// Logging settings
    pub logging: LoggingConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_SERVER_ADDRESS.to_string(),
            grpc_address: None,
            store_interval: Duration::from_secs(DEFAULT_STORE_INTERVAL_SECS),
            store_file: Some(PathBuf::from(DEFAULT_STORE_FILE)),
            restore: true,
            key: None,
            crypto_key: None,
            database_dsn: None,
            trusted_subnet: None,
            logging: LoggingConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Signing key, ignoring an empty value
    pub fn signing_key(&self) -> Option<&str> {
        non_empty(self.key.as_deref())
    }

    /// Private key path, ignoring an empty value
    pub fn crypto_key_path(&self) -> Option<&Path> {
        self.crypto_key
            .as_deref()
            .filter(|p| !p.as_os_str().is_empty())
    }

    /// Snapshot file, ignoring an empty value
    pub fn snapshot_file(&self) -> Option<&Path> {
        self.store_file
            .as_deref()
            .filter(|p| !p.as_os_str().is_empty())
    }

    /// Database DSN, ignoring an empty value
    pub fn database(&self) -> Option<&str> {
        non_empty(self.database_dsn.as_deref())
    }

    /// RPC listen address, ignoring an empty value
    pub fn rpc_address(&self) -> Option<&str> {
        non_empty(self.grpc_address.as_deref())
    }

    /// Parsed trusted subnet
    pub fn trusted(&self) -> Result<Option<TrustedSubnet>> {
        non_empty(self.trusted_subnet.as_deref())
            .map(str::parse::<TrustedSubnet>)
            .transpose()
    }
}

impl LoadableConfig for ServerConfig {
    const ENV_PREFIX: &'static str = SERVER_ENV_PREFIX;

    const LEGACY_ENV: &'static [(&'static str, &'static str)] = &[
        ("ADDRESS", "address"),
        ("ADDRESS_GRPC", "grpc_address"),
        ("STORE_INTERVAL", "store_interval"),
        ("STORE_FILE", "store_file"),
        ("RESTORE", "restore"),
        ("KEY", "key"),
        ("CRYPTO_KEY", "crypto_key"),
        ("DATABASE_DSN", "database_dsn"),
        ("TRUSTED_SUBNET", "trusted_subnet"),
    ];

    fn validate(&self) -> Result<()> {
        if self.address.trim().is_empty() {
            return Err(Error::configuration("Server address cannot be empty"));
        }
        self.trusted()?;
        Ok(())
    }
}

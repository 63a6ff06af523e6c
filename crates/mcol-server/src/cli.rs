//! Command line interface
//!
//! Every flag is optional; a set flag wins over the config file and the
//! environment. The struct doubles as the figment override layer, so unset
//! flags serialize to nothing.

use std::path::PathBuf;

use clap::Parser;
use serde::Serialize;

/// Command line interface for the metric collector server
#[derive(Parser, Debug, Default, Serialize)]
#[command(name = "mcol-server")]
#[command(about = "Metric collector server - HTTP and RPC ingestion")]
#[command(version)]
pub struct Cli {
    /// Path to configuration file (TOML or JSON)
    #[arg(short, long)]
    #[serde(skip)]
    pub config: Option<PathBuf>,

    /// HTTP listen address as host:port
    #[arg(short, long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    /// RPC listen address as host:port; enables the RPC service
    #[arg(short, long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grpc_address: Option<String>,

    /// Snapshot period such as "300s"; 0 writes the snapshot on every update
    #[arg(short = 'i', long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_interval: Option<String>,

    /// Snapshot file of the in-memory engine
    #[arg(short = 'f', long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_file: Option<PathBuf>,

    /// Load the snapshot on start
    #[arg(short, long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restore: Option<bool>,

    /// Shared HMAC key
    #[arg(short, long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,

    /// PEM private key for encrypted payloads
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crypto_key: Option<PathBuf>,

    /// PostgreSQL DSN; selects the relational engine
    #[arg(short, long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_dsn: Option<String>,

    /// CIDR whose members may write
    #[arg(short, long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trusted_subnet: Option<String>,
}

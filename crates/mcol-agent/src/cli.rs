//! Command line interface

use std::path::PathBuf;

use clap::Parser;
use serde::Serialize;

/// Command line interface for the metric collector agent
///
/// Set flags win over the config file and the environment.
#[derive(Parser, Debug, Default, Serialize)]
#[command(name = "mcol-agent")]
#[command(about = "Metric collector agent - samples the host and reports to the collector")]
#[command(version)]
pub struct Cli {
    /// Path to configuration file (TOML or JSON)
    #[arg(short, long)]
    #[serde(skip)]
    pub config: Option<PathBuf>,

    /// Collector HTTP address as host:port
    #[arg(short, long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    /// Collector RPC address as host:port
    #[arg(short, long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grpc_address: Option<String>,

    /// Transport: http or grpc
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,

    /// Sampling period such as "2s"
    #[arg(short, long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poll_interval: Option<String>,

    /// Report period such as "10s"
    #[arg(short, long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_interval: Option<String>,

    /// Send attempts per report
    #[arg(short = 'n', long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retries: Option<u32>,

    /// Base pause between attempts such as "10s"
    #[arg(short = 't', long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_delay: Option<String>,

    /// Shared HMAC key
    #[arg(short, long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,

    /// PEM public key; HTTP payloads are encrypted when set
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crypto_key: Option<PathBuf>,
}

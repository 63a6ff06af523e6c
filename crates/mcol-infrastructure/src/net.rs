//! Networking helpers
//!
//! Trusted subnet checks shared by the HTTP and RPC surfaces, outbound
//! address discovery for the agent, and `host:port` parsing.

use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use ipnet::IpNet;
use mcol_domain::error::{Error, Result};
use tokio::net::UdpSocket;

use crate::constants::OUTBOUND_PROBE_ADDRESS;
use crate::error_ext::ErrorContext;

/// CIDR range whose members may write metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrustedSubnet(IpNet);

impl TrustedSubnet {
    /// Whether `ip` is inside the subnet
    pub fn contains(&self, ip: IpAddr) -> bool {
        self.0.contains(&ip)
    }

    /// Check the caller's self-reported address
    ///
    /// A missing or unparsable address is rejected like an outside one.
    pub fn check(&self, caller: Option<&str>) -> Result<()> {
        let raw = caller
            .map(str::trim)
            .filter(|raw| !raw.is_empty())
            .ok_or_else(|| Error::forbidden("IP address could not be parsed: no real IP given"))?;
        let ip: IpAddr = raw
            .parse()
            .map_err(|e| Error::forbidden(format!("IP address could not be parsed: {e}")))?;
        if self.contains(ip) {
            Ok(())
        } else {
            Err(Error::forbidden("IP address is not inside trusted network"))
        }
    }
}

impl FromStr for TrustedSubnet {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        s.trim()
            .parse::<IpNet>()
            .map(Self)
            .config_context(format!("Invalid trusted subnet {s:?}"))
    }
}

impl fmt::Display for TrustedSubnet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Address of the interface used for outbound traffic
///
/// Connecting a UDP socket selects a route without sending anything.
pub async fn outbound_ip() -> Result<IpAddr> {
    let socket = UdpSocket::bind(("0.0.0.0", 0))
        .await
        .network_context("Failed to bind probe socket")?;
    socket
        .connect(OUTBOUND_PROBE_ADDRESS)
        .await
        .network_context("Failed to resolve outbound route")?;
    let local: SocketAddr = socket
        .local_addr()
        .network_context("Failed to read outbound address")?;
    Ok(local.ip())
}

/// Split `host:port`, defaulting the host to all interfaces when empty
pub fn split_host_port(address: &str) -> Result<(String, u16)> {
    let address = address.trim();
    let address = address
        .strip_prefix("http://")
        .or_else(|| address.strip_prefix("https://"))
        .unwrap_or(address);
    let (host, port) = address
        .rsplit_once(':')
        .ok_or_else(|| Error::configuration(format!("Address {address:?} has no port")))?;
    let port = port
        .parse::<u16>()
        .config_context(format!("Address {address:?} has an invalid port"))?;
    let host = host.trim_start_matches('[').trim_end_matches(']');
    let host = if host.is_empty() { "0.0.0.0" } else { host };
    Ok((host.to_string(), port))
}

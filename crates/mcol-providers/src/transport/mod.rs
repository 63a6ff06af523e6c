//! Agent to collector transports
//!
//! The protocol is chosen by configuration: JSON over HTTP with gzip and
//! optional RSA framing, or the unary `UpdateMetrics` RPC.

pub mod grpc;
pub mod http;

pub use grpc::GrpcTransport;
pub use http::HttpTransport;

use std::net::IpAddr;
use std::sync::Arc;

use mcol_domain::error::Result;
use mcol_domain::ports::MetricTransport;
use mcol_infrastructure::config::{AgentConfig, Protocol};
use mcol_infrastructure::crypto::PayloadEncryptor;
use tracing::info;

/// Build the transport the agent configuration asks for
///
/// `real_ip` is reported to the collector for its trusted subnet check.
pub fn build_transport(
    config: &AgentConfig,
    real_ip: Option<IpAddr>,
) -> Result<Arc<dyn MetricTransport>> {
    let transport: Arc<dyn MetricTransport> = match config.protocol {
        Protocol::Http => {
            let encryptor = config
                .crypto_key_path()
                .map(PayloadEncryptor::from_pem_file)
                .transpose()?;
            Arc::new(HttpTransport::new(
                &config.address,
                config.request_timeout,
                encryptor,
                real_ip,
            )?)
        }
        Protocol::Grpc => Arc::new(GrpcTransport::new(
            &config.grpc_address,
            config.request_timeout,
            real_ip,
        )?),
    };
    info!(protocol = transport.protocol(), "[TRANSPORT] Transport ready");
    Ok(transport)
}

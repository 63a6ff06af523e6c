//! RPC transport
//!
//! Sends the batch with the unary `UpdateMetrics` call. The agent's address
//! travels in the `x-real-ip` metadata entry; a non-empty error string in
//! the reply counts as a failure.

use std::net::IpAddr;
use std::time::Duration;

use async_trait::async_trait;
use mcol_api::v1::UpdateMetricsRequest;
use mcol_api::{MetricsClient, REAL_IP_METADATA};
use mcol_domain::MetricBatch;
use mcol_domain::error::{Error, Result};
use mcol_domain::ports::MetricTransport;
use mcol_infrastructure::ErrorContext;
use tonic::metadata::MetadataValue;
use tonic::transport::{Channel, Endpoint};
use tracing::debug;

/// RPC transport
pub struct GrpcTransport {
    client: MetricsClient<Channel>,
    real_ip: Option<MetadataValue<tonic::metadata::Ascii>>,
}

impl GrpcTransport {
    /// Transport calling the collector's RPC endpoint at `address`
    ///
    /// The connection is opened lazily on the first call.
    pub fn new(address: &str, timeout: Duration, real_ip: Option<IpAddr>) -> Result<Self> {
        let uri = if address.starts_with("http://") || address.starts_with("https://") {
            address.to_string()
        } else {
            format!("http://{address}")
        };
        let channel = Endpoint::from_shared(uri)
            .config_context(format!("Invalid RPC address {address:?}"))?
            .timeout(timeout)
            .connect_timeout(timeout)
            .connect_lazy();
        let real_ip = real_ip
            .map(|ip| MetadataValue::try_from(ip.to_string()))
            .transpose()
            .config_context("Invalid real IP metadata")?;
        Ok(Self {
            client: MetricsClient::new(channel),
            real_ip,
        })
    }
}

#[async_trait]
impl MetricTransport for GrpcTransport {
    async fn send(&self, batch: &MetricBatch) -> Result<()> {
        let mut request = tonic::Request::new(UpdateMetricsRequest::from(batch));
        if let Some(ip) = &self.real_ip {
            request.metadata_mut().insert(REAL_IP_METADATA, ip.clone());
        }

        let response = self
            .client
            .clone()
            .update_metrics(request)
            .await
            .map_err(|status| {
                Error::network(format!("UpdateMetrics failed: {}", status.message()))
            })?;
        response.into_inner().into_result()?;

        debug!(count = batch.len(), "[TRANSPORT] Batch delivered over RPC");
        Ok(())
    }

    fn protocol(&self) -> &str {
        "grpc"
    }
}

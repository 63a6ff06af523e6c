//! JSON over HTTP transport
//!
//! The batch is posted to `/updates/` as gzip, or as base64 RSA-OAEP blocks
//! over the gzip bytes when a public key is configured.

use std::net::IpAddr;
use std::time::Duration;

use async_trait::async_trait;
use mcol_domain::MetricBatch;
use mcol_domain::constants::REAL_IP_HEADER;
use mcol_domain::error::{Error, Result};
use mcol_domain::ports::MetricTransport;
use mcol_infrastructure::ErrorContext;
use mcol_infrastructure::codec::seal;
use mcol_infrastructure::crypto::PayloadEncryptor;
use reqwest::Client;
use reqwest::header::{CONTENT_ENCODING, CONTENT_TYPE};
use tracing::debug;

use crate::constants::{BATCH_UPDATE_PATH, CONTENT_TYPE_JSON};

/// HTTP transport
pub struct HttpTransport {
    client: Client,
    url: String,
    encryptor: Option<PayloadEncryptor>,
    real_ip: Option<String>,
}

impl HttpTransport {
    /// Transport posting to the collector at `address`
    pub fn new(
        address: &str,
        timeout: Duration,
        encryptor: Option<PayloadEncryptor>,
        real_ip: Option<IpAddr>,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .network_context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            url: batch_url(address),
            encryptor,
            real_ip: real_ip.map(|ip| ip.to_string()),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

/// `http://{address}/updates/`, accepting an address with or without scheme
pub fn batch_url(address: &str) -> String {
    let host = address
        .trim()
        .trim_start_matches("http://")
        .trim_end_matches('/');
    format!("http://{host}{BATCH_UPDATE_PATH}")
}

#[async_trait]
impl MetricTransport for HttpTransport {
    async fn send(&self, batch: &MetricBatch) -> Result<()> {
        let json = serde_json::to_vec(batch).codec_context("Failed to encode batch")?;
        let envelope = seal(&json, self.encryptor.as_ref())?;

        let mut request = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, CONTENT_TYPE_JSON)
            .header(CONTENT_ENCODING, envelope.encoding.as_str());
        if let Some(ip) = &self.real_ip {
            request = request.header(REAL_IP_HEADER, ip);
        }

        let response = request
            .body(envelope.body)
            .send()
            .await
            .network_context(format!("POST {} failed", self.url))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::network(format!(
                "Collector answered {status}: {}",
                body.trim_end()
            )));
        }
        debug!(count = batch.len(), url = %self.url, "[TRANSPORT] Batch delivered over HTTP");
        Ok(())
    }

    fn protocol(&self) -> &str {
        "http"
    }
}

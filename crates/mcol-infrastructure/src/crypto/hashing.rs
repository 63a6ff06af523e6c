//! Keyed hashing of wire metrics

use hmac::{Hmac, Mac};
use mcol_domain::error::{Error, Result};
use mcol_domain::ports::MetricHasher;
use mcol_domain::value_objects::Metrics;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Cryptographic hash utilities
pub struct HashUtils;

impl HashUtils {
    /// Compute HMAC-SHA256
    pub fn hmac_sha256(key: &[u8], data: &[u8]) -> Result<Vec<u8>> {
        let mut mac =
            <HmacSha256 as Mac>::new_from_slice(key).map_err(|e| Error::Infrastructure {
                message: format!("HMAC initialization failed: {e}"),
                source: None,
            })?;
        mac.update(data);
        Ok(mac.finalize().into_bytes().to_vec())
    }

    /// Constant-time comparison for cryptographic values
    pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
        if a.len() != b.len() {
            return false;
        }

        let mut result = 0u8;
        for (x, y) in a.iter().zip(b.iter()) {
            result |= x ^ y;
        }
        result == 0
    }
}

/// HMAC-SHA256 over the canonical form of a metric, hex encoded
#[derive(Clone)]
pub struct HmacMetricHasher {
    key: Vec<u8>,
}

impl HmacMetricHasher {
    /// Create a hasher for the shared key
    pub fn new<K: AsRef<[u8]>>(key: K) -> Self {
        Self {
            key: key.as_ref().to_vec(),
        }
    }
}

impl std::fmt::Debug for HmacMetricHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HmacMetricHasher").finish_non_exhaustive()
    }
}

impl MetricHasher for HmacMetricHasher {
    fn sign(&self, metric: &Metrics) -> Result<String> {
        let canonical = metric.canonical_form()?;
        HashUtils::hmac_sha256(&self.key, canonical.as_bytes()).map(hex::encode)
    }

    fn verify(&self, metric: &Metrics) -> Result<()> {
        let Some(received) = metric.hash.as_deref() else {
            return Err(Error::integrity(format!("{} carries no hash", metric.id)));
        };
        let received = hex::decode(received.trim())
            .map_err(|_| Error::integrity(format!("{} hash is not hex", metric.id)))?;
        let canonical = metric.canonical_form()?;
        let expected = HashUtils::hmac_sha256(&self.key, canonical.as_bytes())?;
        if HashUtils::constant_time_eq(&expected, &received) {
            Ok(())
        } else {
            Err(Error::integrity("Hashes do not agree"))
        }
    }
}

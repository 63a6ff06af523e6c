//! Cryptographic services module
//!
//! - HMAC-SHA256 metric signing and verification
//! - RSA-OAEP(SHA-256) payload encryption and decryption

mod hashing;
mod oaep;

pub use self::hashing::{HashUtils, HmacMetricHasher};
pub use self::oaep::{PayloadDecryptor, PayloadEncryptor};

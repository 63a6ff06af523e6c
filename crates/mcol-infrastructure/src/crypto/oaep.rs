//! RSA-OAEP payload encryption
//!
//! The agent encrypts the gzip bytes of a batch with the collector's public
//! key. Plaintext is cut into chunks that fit one OAEP(SHA-256) block; the
//! ciphertext blocks are concatenated, each exactly one key size long, so the
//! collector can split them back without framing.

use std::path::Path;

use mcol_domain::error::{Error, Result};
use rsa::pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey};
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey};
use rsa::rand_core::OsRng;
use rsa::traits::PublicKeyParts;
use rsa::{Oaep, RsaPrivateKey, RsaPublicKey};
use sha2::Sha256;

use crate::constants::OAEP_SHA256_OVERHEAD;
use crate::error_ext::ErrorContext;

/// Agent side: encrypts payloads with the collector's public key
#[derive(Debug, Clone)]
pub struct PayloadEncryptor {
    key: RsaPublicKey,
}

impl PayloadEncryptor {
    /// Wrap a public key
    pub fn new(key: RsaPublicKey) -> Result<Self> {
        if key.size() <= OAEP_SHA256_OVERHEAD {
            return Err(Error::configuration("RSA key is too small for OAEP(SHA-256)"));
        }
        Ok(Self { key })
    }

    /// Parse a PKCS#1 or SPKI PEM public key
    pub fn from_pem(pem: &str) -> Result<Self> {
        let key = RsaPublicKey::from_pkcs1_pem(pem)
            .or_else(|_| RsaPublicKey::from_public_key_pem(pem))
            .config_context("Public key is neither PKCS#1 nor SPKI PEM")?;
        Self::new(key)
    }

    /// Read a PEM public key file
    pub fn from_pem_file(path: &Path) -> Result<Self> {
        let pem = std::fs::read_to_string(path)
            .io_context(format!("Failed to read public key {}", path.display()))?;
        Self::from_pem(&pem)
    }

    /// Largest plaintext chunk one OAEP block can carry
    pub fn chunk_size(&self) -> usize {
        self.key.size() - OAEP_SHA256_OVERHEAD
    }

    /// Encrypt `plaintext` chunk by chunk
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        let mut rng = OsRng;
        let mut out = Vec::with_capacity(plaintext.len().div_ceil(self.chunk_size()) * self.key.size());
        for chunk in plaintext.chunks(self.chunk_size()) {
            let block = self
                .key
                .encrypt(&mut rng, Oaep::new::<Sha256>(), chunk)
                .codec_context("RSA encryption failed")?;
            out.extend_from_slice(&block);
        }
        Ok(out)
    }
}

/// Collector side: decrypts payloads with the private key
#[derive(Debug, Clone)]
pub struct PayloadDecryptor {
    key: RsaPrivateKey,
}

impl PayloadDecryptor {
    /// Wrap a private key
    pub fn new(key: RsaPrivateKey) -> Self {
        Self { key }
    }

    /// Parse a PKCS#1 or PKCS#8 PEM private key
    pub fn from_pem(pem: &str) -> Result<Self> {
        let key = RsaPrivateKey::from_pkcs1_pem(pem)
            .or_else(|_| RsaPrivateKey::from_pkcs8_pem(pem))
            .config_context("Private key is neither PKCS#1 nor PKCS#8 PEM")?;
        Ok(Self::new(key))
    }

    /// Read a PEM private key file
    pub fn from_pem_file(path: &Path) -> Result<Self> {
        let pem = std::fs::read_to_string(path)
            .io_context(format!("Failed to read private key {}", path.display()))?;
        Self::from_pem(&pem)
    }

    /// Matching public key, for building an encryptor
    pub fn public_key(&self) -> RsaPublicKey {
        self.key.to_public_key()
    }

    /// Decrypt concatenated key-size blocks
    pub fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>> {
        let block = self.key.size();
        if ciphertext.is_empty() || ciphertext.len() % block != 0 {
            return Err(Error::codec(format!(
                "Ciphertext length {} is not a multiple of the key size {block}",
                ciphertext.len()
            )));
        }
        let mut out = Vec::with_capacity(ciphertext.len());
        for chunk in ciphertext.chunks(block) {
            let plain = self
                .key
                .decrypt(Oaep::new::<Sha256>(), chunk)
                .codec_context("RSA decryption failed")?;
            out.extend_from_slice(&plain);
        }
        Ok(out)
    }
}

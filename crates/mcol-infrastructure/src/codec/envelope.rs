//! Request body framing
//!
//! Outbound: JSON is gzip-compressed, then optionally RSA encrypted and base64
//! wrapped. The `Content-Encoding` header tells the two framings apart:
//! `gzip` for plain compression, `64base` for encryption. Encryption replaces
//! the gzip framing rather than stacking on it.
//!
//! Inbound: no encoding means raw JSON, `gzip` means compressed JSON,
//! `64base` means base64 of RSA blocks over compressed JSON.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use mcol_domain::constants::{ENCRYPTED_CONTENT_ENCODING, GZIP_CONTENT_ENCODING};
use mcol_domain::error::{Error, Result};

use super::gzip;
use crate::crypto::{PayloadDecryptor, PayloadEncryptor};

/// Framing of a request body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentEncoding {
    /// Gzip-compressed JSON
    Gzip,
    /// Base64 of RSA-OAEP blocks over gzip-compressed JSON
    Encrypted,
}

impl ContentEncoding {
    /// Header value
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Gzip => GZIP_CONTENT_ENCODING,
            Self::Encrypted => ENCRYPTED_CONTENT_ENCODING,
        }
    }
}

/// An encoded body with its header value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    /// Value of `Content-Encoding`
    pub encoding: ContentEncoding,
    /// Encoded body
    pub body: Vec<u8>,
}

/// Frame a JSON payload for sending
pub fn seal(json: &[u8], encryptor: Option<&PayloadEncryptor>) -> Result<Envelope> {
    let compressed = gzip::compress(json)?;
    Ok(match encryptor {
        Some(encryptor) => Envelope {
            encoding: ContentEncoding::Encrypted,
            body: STANDARD.encode(encryptor.encrypt(&compressed)?).into_bytes(),
        },
        None => Envelope {
            encoding: ContentEncoding::Gzip,
            body: compressed,
        },
    })
}

/// Recover the JSON payload of a received body
///
/// `encodings` are the raw `Content-Encoding` header values. Unknown
/// encodings and encrypted bodies without a private key are client errors.
pub fn open(body: &[u8], encodings: &[&str], decryptor: Option<&PayloadDecryptor>) -> Result<Vec<u8>> {
    match classify(encodings)? {
        Some(ContentEncoding::Encrypted) => {
            let decryptor = decryptor.ok_or_else(|| {
                Error::invalid_argument("Encrypted payload received but no private key is configured")
            })?;
            let text: Vec<u8> = body.iter().copied().filter(|b| !b.is_ascii_whitespace()).collect();
            let ciphertext = STANDARD.decode(text)?;
            gzip::decompress(&decryptor.decrypt(&ciphertext)?)
        }
        Some(ContentEncoding::Gzip) => gzip::decompress(body),
        None => Ok(body.to_vec()),
    }
}

/// Strongest framing named by the header values, `None` for raw bodies
fn classify(encodings: &[&str]) -> Result<Option<ContentEncoding>> {
    let mut found = None;
    for value in encodings.iter().flat_map(|v| v.split(',')) {
        let value = value.trim();
        if value.is_empty() || value.eq_ignore_ascii_case("identity") {
            continue;
        }
        if value.eq_ignore_ascii_case(ENCRYPTED_CONTENT_ENCODING) {
            found = Some(ContentEncoding::Encrypted);
        } else if value.eq_ignore_ascii_case(GZIP_CONTENT_ENCODING) {
            found = found.or(Some(ContentEncoding::Gzip));
        } else {
            return Err(Error::invalid_argument(format!(
                "Only gzip and 64base encodings are allowed, got {value}"
            )));
        }
    }
    Ok(found)
}

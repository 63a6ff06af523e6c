//! Tests for request body framing

use std::sync::OnceLock;

use mcol_domain::Error;
use mcol_infrastructure::codec::{ContentEncoding, gzip, open, seal};
use mcol_infrastructure::crypto::{PayloadDecryptor, PayloadEncryptor};
use rsa::RsaPrivateKey;
use rsa::rand_core::OsRng;

const JSON: &[u8] = br#"[{"id":"PollCount","type":"counter","delta":1}]"#;

fn decryptor() -> &'static PayloadDecryptor {
    static KEY: OnceLock<PayloadDecryptor> = OnceLock::new();
    KEY.get_or_init(|| {
        PayloadDecryptor::new(RsaPrivateKey::new(&mut OsRng, 1024).expect("generate key"))
    })
}

#[test]
fn test_plain_framing_is_gzip() {
    let envelope = seal(JSON, None).expect("seal");

    assert_eq!(envelope.encoding, ContentEncoding::Gzip);
    assert_eq!(envelope.encoding.as_str(), "gzip");
    assert_eq!(gzip::decompress(&envelope.body).expect("gunzip"), JSON);
    assert_eq!(open(&envelope.body, &["gzip"], None).expect("open"), JSON);
}

#[test]
fn test_encrypted_framing_round_trip() {
    let encryptor = PayloadEncryptor::new(decryptor().public_key()).expect("encryptor");
    let envelope = seal(JSON, Some(&encryptor)).expect("seal");

    assert_eq!(envelope.encoding.as_str(), "64base");
    assert!(envelope.body.iter().all(u8::is_ascii));
    assert_eq!(
        open(&envelope.body, &["64base"], Some(decryptor())).expect("open"),
        JSON
    );
}

#[test]
fn test_encrypted_body_without_private_key_is_rejected() {
    let encryptor = PayloadEncryptor::new(decryptor().public_key()).expect("encryptor");
    let envelope = seal(JSON, Some(&encryptor)).expect("seal");

    let result = open(&envelope.body, &["64base"], None);
    assert!(matches!(result, Err(Error::InvalidArgument { .. })));
}

#[test]
fn test_raw_body_passes_through() {
    assert_eq!(open(JSON, &[], None).expect("open"), JSON);
    assert_eq!(open(JSON, &["identity"], None).expect("open"), JSON);
}

#[test]
fn test_unknown_encoding_is_rejected() {
    let result = open(JSON, &["br"], None);
    assert!(matches!(result, Err(Error::InvalidArgument { .. })));
}

#[test]
fn test_corrupt_gzip_is_a_client_error() {
    let err = open(b"not gzip", &["gzip"], None).unwrap_err();
    assert!(err.is_client_error());
}

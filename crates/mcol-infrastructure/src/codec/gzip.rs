//! Gzip helpers

use std::io::{Read, Write};

use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use mcol_domain::error::Result;

use crate::error_ext::ErrorContext;

/// Compress `data` with the default level
pub fn compress(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::with_capacity(data.len() / 2), Compression::default());
    encoder.write_all(data).codec_context("Failed to gzip payload")?;
    encoder.finish().codec_context("Failed to finish gzip stream")
}

/// Decompress a complete gzip stream
pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(data.len() * 4);
    GzDecoder::new(data)
        .read_to_end(&mut out)
        .codec_context("Failed to gunzip payload")?;
    Ok(out)
}

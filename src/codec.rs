//! Cache key derivation and body encoding for persisted records

use std::io::{Read, Write};

use base64::{Engine as _, engine::general_purpose::STANDARD};
use flate2::{Compression, read::GzDecoder, write::GzEncoder};
use sha2::{Digest, Sha256};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("body is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("body compression failed: {0}")]
    Compression(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CodecError>;

/// Hex SHA-256 of the normalized URL; every persisted field of a URL shares it.
pub fn cache_key(url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    hex::encode(hasher.finalize())
}

/// Gzip then base64 so the body fits inside a JSON cache value
pub fn encode_body(body: &[u8]) -> Result<String> {
    if body.is_empty() {
        return Ok(String::new());
    }

    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(body)?;
    let compressed = encoder.finish()?;

    Ok(STANDARD.encode(compressed))
}

pub fn decode_body(encoded: &str) -> Result<Vec<u8>> {
    if encoded.is_empty() {
        return Ok(Vec::new());
    }

    let compressed = STANDARD.decode(encoded)?;
    let mut decoder = GzDecoder::new(compressed.as_slice());
    let mut body = Vec::new();
    decoder.read_to_end(&mut body)?;

    Ok(body)
}

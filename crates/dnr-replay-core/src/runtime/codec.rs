// crates/dnr-replay-core/src/runtime/codec.rs
// ============================================================================
// Module: Gzip Codec
// Description: Gzip compression helpers for stored and submitted artifacts.
// Purpose: Bound decompressed output and surface codec failures as errors.
// Dependencies: flate2, thiserror
// ============================================================================

//! ## Overview
//! Every artifact in the source store is gzip-compressed; so are the solver
//! request body and the republished screen usage object.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Read;
use std::io::Write;

use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Gzip codec failures.
#[derive(Debug, Error)]
pub enum CodecError {
    /// Compression failed.
    #[error("gzip compress failed: {0}")]
    Compress(String),
    /// Input is not valid gzip.
    #[error("gzip decompress failed: {0}")]
    Decompress(String),
    /// Decompressed output exceeds the limit.
    #[error("decompressed output exceeds {max_bytes} bytes")]
    TooLarge {
        /// Maximum allowed bytes.
        max_bytes: usize,
    },
    /// Decompressed output is not UTF-8 text.
    #[error("decompressed output is not utf-8")]
    NotUtf8,
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Gzip-compresses bytes in memory.
///
/// # Errors
///
/// Returns [`CodecError::Compress`] when the encoder fails.
pub fn gzip_compress(bytes: &[u8]) -> Result<Vec<u8>, CodecError> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(bytes).map_err(|err| CodecError::Compress(err.to_string()))?;
    encoder.finish().map_err(|err| CodecError::Compress(err.to_string()))
}

/// Decompresses gzip bytes, rejecting output larger than `max_bytes`.
///
/// # Errors
///
/// Returns [`CodecError`] when the input is malformed or too large.
pub fn gzip_decompress(bytes: &[u8], max_bytes: usize) -> Result<Vec<u8>, CodecError> {
    let limit = u64::try_from(max_bytes).unwrap_or(u64::MAX).saturating_add(1);
    let mut decoder = GzDecoder::new(bytes).take(limit);
    let mut output = Vec::new();
    decoder.read_to_end(&mut output).map_err(|err| CodecError::Decompress(err.to_string()))?;
    if output.len() > max_bytes {
        return Err(CodecError::TooLarge {
            max_bytes,
        });
    }
    Ok(output)
}

/// Decompresses gzip bytes into UTF-8 text.
///
/// # Errors
///
/// Returns [`CodecError`] when the input is malformed, too large, or not UTF-8.
pub fn gzip_decompress_text(bytes: &[u8], max_bytes: usize) -> Result<String, CodecError> {
    let output = gzip_decompress(bytes, max_bytes)?;
    String::from_utf8(output).map_err(|_| CodecError::NotUtf8)
}

#[cfg(test)]
mod tests;

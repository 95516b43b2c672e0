// crates/dnr-replay-core/src/runtime/codec/tests.rs
// ============================================================================
// Module: Gzip Codec Tests
// Description: Unit tests for gzip helpers.
// Purpose: Validate round trips, size limits, and malformed input handling.
// Dependencies: dnr-replay-core, proptest
// ============================================================================

#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::panic,
    reason = "Test-only assertions favor direct unwrap/expect for clarity."
)]

use proptest::prelude::*;

use super::*;

#[test]
fn decompress_rejects_non_gzip_input() {
    let result = gzip_decompress(b"plain text", 1024);
    assert!(matches!(result, Err(CodecError::Decompress(_))));
}

#[test]
fn decompress_enforces_limit() {
    let compressed = gzip_compress(&[b'a'; 64]).expect("compress");
    let result = gzip_decompress(&compressed, 63);
    assert!(matches!(result, Err(CodecError::TooLarge { max_bytes: 63 })));
    let exact = gzip_decompress(&compressed, 64).expect("exact limit");
    assert_eq!(exact.len(), 64);
}

#[test]
fn decompress_text_rejects_invalid_utf8() {
    let compressed = gzip_compress(&[0xff, 0xfe, 0xfd]).expect("compress");
    let result = gzip_decompress_text(&compressed, 1024);
    assert!(matches!(result, Err(CodecError::NotUtf8)));
}

proptest! {
    #[test]
    fn compress_then_decompress_preserves_bytes(bytes in proptest::collection::vec(any::<u8>(), 0..4096)) {
        let compressed = gzip_compress(&bytes).unwrap();
        let restored = gzip_decompress(&compressed, 4096).unwrap();
        prop_assert_eq!(restored, bytes);
    }
}

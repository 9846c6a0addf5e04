//! Malformed input and failing sinks.

use oxipress_core::{CompressionLevel, Corruption, FlateError};
use oxipress_deflate::{compress, compress_to, decompress, decompress_prefix};
use std::io::{self, Write};

fn sample() -> Vec<u8> {
    let mut data = b"Corruption must never go unnoticed. ".repeat(40);
    data.extend((0..=255u8).rev());
    data
}

#[test]
fn test_trailing_bytes_rejected() {
    let data = sample();
    let compressed = compress(&data).unwrap();

    for extra in [&[0u8][..], &[0xFF, 0xFF][..], &b"garbage"[..]] {
        let mut padded = compressed.clone();
        padded.extend_from_slice(extra);
        let err = decompress(&padded).unwrap_err();
        assert_eq!(err.corruption(), Some(&Corruption::TrailingData(extra.len())));
        assert!(
            err.to_string()
                .contains("unexpected content after decompression")
        );
    }
}

#[test]
fn test_prefix_reports_stream_length() {
    let data = sample();
    let compressed = compress(&data).unwrap();
    let mut framed = compressed.clone();
    framed.extend_from_slice(&[0xDE, 0xAD, 0xBE, 0xEF]);

    let (output, consumed) = decompress_prefix(&framed).unwrap();
    assert_eq!(output, data);
    assert_eq!(consumed, compressed.len());
}

#[test]
fn test_every_truncation_fails() {
    for level in [0, 1, 9] {
        let compressed =
            oxipress_deflate::compress_with_level(&sample(), CompressionLevel::new(level))
                .unwrap();
        for cut in 0..compressed.len() {
            let err = decompress(&compressed[..cut]).unwrap_err();
            assert!(err.is_corrupt(), "level {level}, cut at {cut}");
        }
    }
}

#[test]
fn test_bit_flips_never_panic() {
    let compressed = compress(&sample()).unwrap();
    for index in 0..compressed.len() {
        for bit in 0..8 {
            let mut damaged = compressed.clone();
            damaged[index] ^= 1 << bit;
            // Either a clean error or some output; never a panic.
            if let Err(err) = decompress(&damaged) {
                assert!(err.is_corrupt());
            }
        }
    }
}

#[test]
fn test_garbage_input() {
    for garbage in [&b"\xFF\xFF\xFF\xFF"[..], &b"not deflate at all"[..], &[0x06; 16][..]] {
        assert!(decompress(garbage).is_err());
    }
}

#[test]
fn test_stored_length_mismatch() {
    let mut compressed = oxipress_deflate::compress_with_level(b"abc", CompressionLevel::NONE)
        .unwrap();
    compressed[3] ^= 0x01;
    let err = decompress(&compressed).unwrap_err();
    assert!(matches!(
        err.corruption(),
        Some(Corruption::StoredLengthMismatch { len: 3, .. })
    ));
}

/// Accepts a fixed number of bytes, then refuses everything.
#[derive(Debug)]
struct LimitedSink {
    accepted: Vec<u8>,
    limit: usize,
}

impl Write for LimitedSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let room = self.limit - self.accepted.len();
        if room == 0 {
            return Err(io::Error::other("sink is full"));
        }
        let n = room.min(buf.len());
        self.accepted.extend_from_slice(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn test_rejecting_sink_is_encoding_failure() {
    let data: Vec<u8> = (0..200_000u32).map(|i| (i % 251) as u8 ^ (i >> 9) as u8).collect();
    let sink = LimitedSink {
        accepted: Vec::new(),
        limit: 16,
    };
    let err = compress_to(&data, CompressionLevel::NONE, sink).unwrap_err();
    assert!(matches!(err, FlateError::Encoding(_)));
    assert!(!err.is_corrupt());
}

#[test]
fn test_compress_to_vec() {
    let data = sample();
    let sink = compress_to(&data, CompressionLevel::DEFAULT, Vec::new()).unwrap();
    assert_eq!(decompress(&sink).unwrap(), data);
}

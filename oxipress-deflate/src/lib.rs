//! # oxipress Deflate
//!
//! Pure Rust implementation of the DEFLATE compression algorithm (RFC 1951).
//!
//! Streams are raw DEFLATE: no zlib or gzip framing and no checksum. Any
//! conforming decoder reads what [`compress`] writes, and [`decompress`]
//! reads any conforming stream.
//!
//! ## Features
//!
//! - **Decompression**: all three block types
//!   - Stored (uncompressed) blocks
//!   - Fixed Huffman codes
//!   - Dynamic Huffman codes
//! - **Compression**: LZ77 + Huffman encoding
//!   - Compression levels 0-9
//!   - Per-block choice of the smallest of the three encodings
//! - **Strictness**: truncated input and bytes after the final block are
//!   errors, never silently accepted
//!
//! ## Example
//!
//! ```rust
//! use oxipress_deflate::{compress, decompress};
//!
//! let original = b"Hello, World! Hello, World!";
//! let compressed = compress(original).unwrap();
//! let decompressed = decompress(&compressed).unwrap();
//! assert_eq!(&decompressed, original);
//!
//! let mut padded = compressed.clone();
//! padded.push(0);
//! assert!(decompress(&padded).is_err());
//! ```
//!
//! ## Compression Levels
//!
//! - Level 0: No compression (stored blocks)
//! - Level 1-3: Fast compression, greedy matching
//! - Level 4-6: Balanced, lazy matching
//! - Level 7-9: Best compression (slower, default for [`compress`])

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod deflate;
pub mod huffman;
pub mod inflate;
pub mod lz77;
pub mod tables;

use oxipress_core::{CompressionLevel, Result};
use std::io::Write;

// Re-exports
pub use deflate::{BlockKind, DeflateStats, Deflater, deflate};
pub use inflate::{InflatePhase, Inflater, inflate, inflate_prefix};
pub use lz77::{MatchFinder, Token};

/// Compress `data` at [`CompressionLevel::BEST`].
pub fn compress(data: &[u8]) -> Result<Vec<u8>> {
    compress_with_level(data, CompressionLevel::BEST)
}

/// Compress `data` at the given level.
pub fn compress_with_level(data: &[u8], level: CompressionLevel) -> Result<Vec<u8>> {
    deflate(data, level)
}

/// Compress `data` into `sink` and hand the sink back.
///
/// Fails with [`FlateError::Encoding`](oxipress_core::FlateError::Encoding)
/// when the sink rejects a write.
pub fn compress_to<W: Write>(data: &[u8], level: CompressionLevel, sink: W) -> Result<W> {
    Deflater::new(level).deflate_into(data, sink)
}

/// Decompress a buffer holding exactly one DEFLATE stream.
pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    inflate(data)
}

/// Decompress the DEFLATE stream at the front of `data`.
///
/// Returns the output and the number of bytes the stream occupied; anything
/// after that is left for the caller.
pub fn decompress_prefix(data: &[u8]) -> Result<(Vec<u8>, usize)> {
    inflate_prefix(data)
}

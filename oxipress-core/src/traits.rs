//! Core traits for whole-buffer compression.
//!
//! Codecs implement [`Compressor`] and [`Decompressor`] so that callers such
//! as the command-line tool can drive any of them through the same
//! compress / decompress / verify cycle.

use crate::error::Result;
use std::fmt;
use std::io::Write;

/// Compression level, from 0 (store only) to 9 (best compression).
///
/// Levels only trade encoder effort against output size. Every level
/// produces output the same decoder accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CompressionLevel(u8);

impl CompressionLevel {
    /// No compression, stored blocks only.
    pub const NONE: Self = Self(0);
    /// Fastest compression.
    pub const FAST: Self = Self(1);
    /// Balanced default.
    pub const DEFAULT: Self = Self(6);
    /// Best compression.
    pub const BEST: Self = Self(9);

    /// Create a level, clamping values above 9.
    pub fn new(level: u8) -> Self {
        Self(level.min(9))
    }

    /// The numeric level.
    pub fn level(self) -> u8 {
        self.0
    }

    /// Whether this level stores data without compressing it.
    pub fn is_store(self) -> bool {
        self.0 == 0
    }
}

impl Default for CompressionLevel {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl From<u8> for CompressionLevel {
    fn from(level: u8) -> Self {
        Self::new(level)
    }
}

impl fmt::Display for CompressionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A whole-buffer compressor (encoder).
pub trait Compressor {
    /// Compress `input` into `sink` and return the sink.
    ///
    /// Fails only if the sink rejects bytes.
    fn compress_into<W: Write>(&mut self, input: &[u8], sink: W) -> Result<W>;

    /// Compress `input` into a new buffer.
    fn compress(&mut self, input: &[u8]) -> Result<Vec<u8>> {
        self.compress_into(input, Vec::new())
    }
}

/// A whole-buffer decompressor (decoder).
pub trait Decompressor {
    /// Decompress a complete stream. Bytes after the end of the stream are an
    /// error.
    fn decompress(&mut self, input: &[u8]) -> Result<Vec<u8>>;

    /// Reset to the initial state so the value can decode another stream.
    fn reset(&mut self);

    /// Whether the last stream decoded to its end marker.
    fn is_finished(&self) -> bool;
}

//! # oxipress Core
//!
//! Core components shared by the oxipress codecs:
//!
//! - [`bitstream`]: LSB-first bit reader (over a slice) and writer (over any sink)
//! - [`history`]: decoder output with back-reference copying
//! - [`traits`]: whole-buffer compressor/decompressor traits and compression level
//! - [`error`]: error taxonomy
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ CLI                                                     │
//! │     demo, compress, decompress, roundtrip               │
//! ├─────────────────────────────────────────────────────────┤
//! │ Codec                                                   │
//! │     Deflate (LZ77 + canonical Huffman)                  │
//! ├─────────────────────────────────────────────────────────┤
//! │ BitStream (this crate)                                  │
//! │     BitReader/BitWriter, OutputHistory, errors          │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use oxipress_core::{BitReader, BitWriter, OutputHistory};
//!
//! let mut writer = BitWriter::new(Vec::new());
//! writer.write_bits(0xABC, 12).unwrap();
//! let bytes = writer.finish().unwrap();
//!
//! let mut reader = BitReader::new(&bytes);
//! assert_eq!(reader.read_bits(12).unwrap(), 0xABC);
//!
//! let mut history = OutputHistory::deflate();
//! history.extend_literals(b"ab");
//! history.copy_match(2, 4).unwrap();
//! assert_eq!(history.output(), b"ababab");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod bitstream;
pub mod error;
pub mod history;
pub mod traits;

// Re-exports for convenience
pub use bitstream::{BitReader, BitWriter};
pub use error::{Corruption, FlateError, Result};
pub use history::{DEFLATE_WINDOW, OutputHistory};
pub use traits::{CompressionLevel, Compressor, Decompressor};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::error::{Corruption, FlateError, Result};
    pub use crate::traits::{CompressionLevel, Compressor, Decompressor};
}

//! Error types for oxipress operations.
//!
//! Two failure classes exist and both are returned to the immediate caller:
//!
//! - [`FlateError::Encoding`]: the sink receiving compressed bytes refused
//!   them. Compressing into a `Vec<u8>` never produces this.
//! - [`FlateError::CorruptStream`]: the compressed input is malformed,
//!   truncated, or followed by unexpected bytes. The [`Corruption`] value
//!   names the exact defect.

use std::io;
use thiserror::Error;

/// The main error type for oxipress operations.
#[derive(Debug, Error)]
pub enum FlateError {
    /// The underlying writer could not accept compressed output.
    #[error("Encoding failed: {0}")]
    Encoding(#[from] io::Error),

    /// The compressed stream is malformed.
    #[error("Corrupt stream at byte {offset}: {corruption}")]
    CorruptStream {
        /// Byte offset in the compressed input where the defect was detected.
        offset: u64,
        /// What was wrong.
        corruption: Corruption,
    },
}

/// A specific defect found while decoding a compressed stream.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Corruption {
    /// Block type 3 is reserved by RFC 1951.
    #[error("reserved block type 3")]
    ReservedBlockType,

    /// Stored block LEN is not the complement of NLEN.
    #[error("stored block length {len:#06x} does not match complement {nlen:#06x}")]
    StoredLengthMismatch {
        /// LEN field.
        len: u16,
        /// NLEN field.
        nlen: u16,
    },

    /// Dynamic header announces more codes than the alphabet has.
    #[error("dynamic header declares {literal_codes} literal/length and {distance_codes} distance codes")]
    TooManyCodes {
        /// HLIT + 257.
        literal_codes: usize,
        /// HDIST + 1.
        distance_codes: usize,
    },

    /// Code lengths describe more codes than the code space holds.
    #[error("over-subscribed Huffman code lengths")]
    OverSubscribed,

    /// Code lengths leave part of the code space unused.
    #[error("incomplete Huffman code lengths")]
    IncompleteCode,

    /// A code length exceeds the 15-bit maximum.
    #[error("code length {0} exceeds the maximum of 15")]
    CodeLengthTooLong(u8),

    /// Repeat-previous code length (16) with nothing to repeat.
    #[error("code length repeat with no previous length")]
    RepeatWithoutPrevious,

    /// A code length run extends past the declared table size.
    #[error("code length run overflows the table")]
    CodeLengthOverflow,

    /// The literal/length table assigns no code to end-of-block.
    #[error("literal/length table has no end-of-block code")]
    MissingEndOfBlock,

    /// Bits that do not form any code of the current table.
    #[error("invalid Huffman code")]
    InvalidCode,

    /// Literal/length symbol 286 or 287.
    #[error("invalid literal/length symbol {0}")]
    InvalidLengthSymbol(u16),

    /// Distance symbol 30 or 31.
    #[error("invalid distance symbol {0}")]
    InvalidDistanceSymbol(u16),

    /// Back-reference with distance 0.
    #[error("back-reference with zero distance")]
    ZeroDistance,

    /// Back-reference reaching before the start of output or beyond the window.
    #[error("back-reference distance {distance} exceeds {available} bytes of history")]
    DistanceTooFar {
        /// Requested distance.
        distance: usize,
        /// Bytes of history that can be referenced.
        available: usize,
    },

    /// Input ended inside a block.
    #[error("unexpected end of input")]
    UnexpectedEof,

    /// Bytes follow the final block.
    #[error("unexpected content after decompression ({0} trailing bytes)")]
    TrailingData(usize),
}

/// Result type alias for oxipress operations.
pub type Result<T> = std::result::Result<T, FlateError>;

impl FlateError {
    /// Create a corrupt stream error.
    pub fn corrupt(offset: u64, corruption: Corruption) -> Self {
        Self::CorruptStream { offset, corruption }
    }

    /// Whether this is a corrupt stream error.
    pub fn is_corrupt(&self) -> bool {
        matches!(self, Self::CorruptStream { .. })
    }

    /// The corruption detail, if this is a corrupt stream error.
    pub fn corruption(&self) -> Option<&Corruption> {
        match self {
            Self::CorruptStream { corruption, .. } => Some(corruption),
            Self::Encoding(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = FlateError::corrupt(12, Corruption::TrailingData(3));
        let text = err.to_string();
        assert!(text.contains("byte 12"));
        assert!(text.contains("unexpected content after decompression"));

        let err = FlateError::corrupt(
            0,
            Corruption::StoredLengthMismatch {
                len: 5,
                nlen: 0x1234,
            },
        );
        assert!(err.to_string().contains("0x0005"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::BrokenPipe, "sink closed");
        let err: FlateError = io_err.into();
        assert!(matches!(err, FlateError::Encoding(_)));
        assert!(!err.is_corrupt());
        assert_eq!(err.corruption(), None);
    }

    #[test]
    fn test_corruption_accessor() {
        let err = FlateError::corrupt(7, Corruption::ZeroDistance);
        assert!(err.is_corrupt());
        assert_eq!(err.corruption(), Some(&Corruption::ZeroDistance));
    }
}

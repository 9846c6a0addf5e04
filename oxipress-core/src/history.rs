//! Decoder output with back-reference support.
//!
//! LZ77 decoding appends literals and copies earlier output forward. Since
//! decompression here is whole-buffer, the output vector doubles as the
//! history: no separate ring is needed, only a bound on how far back a
//! reference may reach.

use crate::error::Corruption;

/// Window size for DEFLATE (32 KB).
pub const DEFLATE_WINDOW: usize = 32768;

/// Growing output buffer that resolves `(distance, length)` back-references.
#[derive(Debug, Clone)]
pub struct OutputHistory {
    /// Everything produced so far.
    output: Vec<u8>,
    /// Farthest distance a back-reference may use.
    window_size: usize,
}

impl OutputHistory {
    /// Create an empty history with the given window size.
    pub fn new(window_size: usize) -> Self {
        Self {
            output: Vec::new(),
            window_size,
        }
    }

    /// Create an empty history with the DEFLATE window size.
    pub fn deflate() -> Self {
        Self::new(DEFLATE_WINDOW)
    }

    /// Bytes produced so far.
    pub fn len(&self) -> usize {
        self.output.len()
    }

    /// Whether nothing has been produced yet.
    pub fn is_empty(&self) -> bool {
        self.output.is_empty()
    }

    /// Append one literal byte.
    #[inline]
    pub fn push_literal(&mut self, byte: u8) {
        self.output.push(byte);
    }

    /// Append a run of literal bytes.
    pub fn extend_literals(&mut self, bytes: &[u8]) {
        self.output.extend_from_slice(bytes);
    }

    /// Copy `length` bytes starting `distance` bytes behind the end of output.
    ///
    /// Overlapping copies (`distance < length`) repeat the referenced bytes,
    /// which is how runs are encoded.
    pub fn copy_match(&mut self, distance: usize, length: usize) -> Result<(), Corruption> {
        if distance == 0 {
            return Err(Corruption::ZeroDistance);
        }
        let available = self.output.len().min(self.window_size);
        if distance > available {
            return Err(Corruption::DistanceTooFar {
                distance,
                available,
            });
        }

        let start = self.output.len() - distance;
        if distance >= length {
            self.output.extend_from_within(start..start + length);
            return Ok(());
        }

        // The source overlaps what is being written: each pass doubles the
        // copied span until `length` bytes are in place.
        self.output.reserve(length);
        let mut copied = 0;
        while copied < length {
            let chunk = (length - copied).min(distance + copied);
            self.output.extend_from_within(start..start + chunk);
            copied += chunk;
        }
        Ok(())
    }

    /// Output produced so far.
    pub fn output(&self) -> &[u8] {
        &self.output
    }

    /// Consume and return the output.
    pub fn into_output(self) -> Vec<u8> {
        self.output
    }

    /// Drop all output.
    pub fn clear(&mut self) {
        self.output.clear();
    }
}

impl Default for OutputHistory {
    fn default() -> Self {
        Self::deflate()
    }
}

//! Bit-level I/O for DEFLATE streams.
//!
//! DEFLATE packs data elements LSB-first: the first bit of a value lands in
//! the least significant free bit of the current byte. Huffman codes are the
//! one exception and are handed to [`BitWriter::write_bits`] already
//! bit-reversed by the caller.
//!
//! [`BitReader`] decodes from an in-memory slice so that the decoder can tell
//! exactly how many input bytes a stream occupied. [`BitWriter`] encodes into
//! any `Write` sink.
//!
//! # Example
//!
//! ```
//! use oxipress_core::bitstream::{BitReader, BitWriter};
//!
//! let mut writer = BitWriter::new(Vec::new());
//! writer.write_bits(0b101, 3).unwrap();
//! writer.write_bits(0b1100, 4).unwrap();
//! let output = writer.finish().unwrap();
//!
//! let mut reader = BitReader::new(&output);
//! assert_eq!(reader.read_bits(3).unwrap(), 0b101);
//! assert_eq!(reader.read_bits(4).unwrap(), 0b1100);
//! ```

use crate::error::{Corruption, FlateError, Result};
use std::io::Write;

/// Bytes staged in a [`BitWriter`] before they are handed to the sink.
const STAGING_CAPACITY: usize = 16 * 1024;

#[inline(always)]
fn low_mask(count: u8) -> u64 {
    (1u64 << count) - 1
}

/// A bit-level reader over a byte slice.
///
/// Up to 64 bits are kept in a buffer. Reads past the end of the slice fail
/// with [`Corruption::UnexpectedEof`]; peeks past the end are zero-padded so
/// table-driven Huffman decoding can look ahead near the end of input.
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    /// Input bytes.
    data: &'a [u8],
    /// Index of the next byte to load into the buffer.
    next: usize,
    /// Bit buffer (LSB-first).
    buffer: u64,
    /// Number of valid bits in buffer.
    bits: u32,
}

impl<'a> BitReader<'a> {
    /// Create a new `BitReader` over `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            next: 0,
            buffer: 0,
            bits: 0,
        }
    }

    #[inline]
    fn refill(&mut self) {
        while self.bits <= 56 {
            let Some(&byte) = self.data.get(self.next) else {
                break;
            };
            self.buffer |= (byte as u64) << self.bits;
            self.bits += 8;
            self.next += 1;
        }
    }

    fn eof(&self) -> FlateError {
        FlateError::corrupt(self.data.len() as u64, Corruption::UnexpectedEof)
    }

    /// Number of bits consumed so far.
    pub fn bit_position(&self) -> u64 {
        self.next as u64 * 8 - self.bits as u64
    }

    /// Index of the first input byte none of whose bits were consumed.
    pub fn byte_position(&self) -> usize {
        self.bit_position().div_ceil(8) as usize
    }

    /// Bytes from [`byte_position`](Self::byte_position) to the end of input.
    pub fn remaining_bytes(&self) -> usize {
        self.data.len() - self.byte_position()
    }

    /// Number of bits that can still be read, capped at 64.
    #[inline]
    pub fn available_bits(&mut self) -> u32 {
        self.refill();
        self.bits
    }

    /// Look at the next `count` bits (0-32) without consuming them.
    ///
    /// Bits beyond the end of input read as zero.
    #[inline]
    pub fn peek_bits(&mut self, count: u8) -> u32 {
        debug_assert!(count <= 32, "Cannot peek more than 32 bits at once");
        self.refill();
        (self.buffer & low_mask(count)) as u32
    }

    /// Discard `count` bits that were previously peeked.
    #[inline]
    pub fn consume(&mut self, count: u8) -> Result<()> {
        if self.bits < count as u32 {
            return Err(self.eof());
        }
        self.buffer >>= count;
        self.bits -= count as u32;
        Ok(())
    }

    /// Read `count` bits (0-32), first bit in the LSB position.
    #[inline]
    pub fn read_bits(&mut self, count: u8) -> Result<u32> {
        debug_assert!(count <= 32, "Cannot read more than 32 bits at once");
        let value = self.peek_bits(count);
        self.consume(count)?;
        Ok(value)
    }

    /// Read a single bit.
    pub fn read_bit(&mut self) -> Result<bool> {
        Ok(self.read_bits(1)? != 0)
    }

    /// Discard bits up to the next byte boundary.
    pub fn align_to_byte(&mut self) {
        let partial = self.bits % 8;
        self.buffer >>= partial;
        self.bits -= partial;
    }

    /// Align to a byte boundary and borrow the next `len` input bytes.
    pub fn read_aligned_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        self.align_to_byte();
        let start = self.byte_position();
        let end = match start.checked_add(len) {
            Some(end) if end <= self.data.len() => end,
            _ => return Err(self.eof()),
        };
        self.next = end;
        self.buffer = 0;
        self.bits = 0;
        Ok(&self.data[start..end])
    }
}

/// A bit-level writer that wraps any `Write` implementation.
///
/// Complete bytes are staged internally and handed to the sink in large
/// chunks. Call [`finish`](Self::finish) to pad the last byte and recover the
/// sink; a sink error surfaces as [`FlateError::Encoding`].
#[derive(Debug)]
pub struct BitWriter<W: Write> {
    /// Underlying writer.
    writer: W,
    /// Complete bytes not yet written to `writer`.
    staged: Vec<u8>,
    /// Bit buffer (LSB-first).
    buffer: u64,
    /// Number of bits in buffer, always below 8 between calls.
    bits: u32,
    /// Total bits written.
    total_bits: u64,
}

impl<W: Write> BitWriter<W> {
    /// Create a new `BitWriter` wrapping the given writer.
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            staged: Vec::with_capacity(STAGING_CAPACITY),
            buffer: 0,
            bits: 0,
            total_bits: 0,
        }
    }

    /// Get a reference to the underlying writer.
    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    /// Total number of bits written so far, padding included.
    pub fn bits_written(&self) -> u64 {
        self.total_bits
    }

    fn drain_if_full(&mut self) -> Result<()> {
        if self.staged.len() >= STAGING_CAPACITY {
            self.writer.write_all(&self.staged)?;
            self.staged.clear();
        }
        Ok(())
    }

    /// Write the low `count` bits (0-32) of `value`, LSB-first.
    #[inline]
    pub fn write_bits(&mut self, value: u32, count: u8) -> Result<()> {
        debug_assert!(count <= 32, "Cannot write more than 32 bits at once");
        if count == 0 {
            return Ok(());
        }

        self.buffer |= (value as u64 & low_mask(count)) << self.bits;
        self.bits += count as u32;
        self.total_bits += count as u64;

        while self.bits >= 8 {
            self.staged.push(self.buffer as u8);
            self.buffer >>= 8;
            self.bits -= 8;
        }
        self.drain_if_full()
    }

    /// Write a single bit.
    pub fn write_bit(&mut self, bit: bool) -> Result<()> {
        self.write_bits(bit as u32, 1)
    }

    /// Pad with zero bits up to the next byte boundary.
    pub fn align_to_byte(&mut self) -> Result<()> {
        if self.bits > 0 {
            self.write_bits(0, (8 - self.bits) as u8)?;
        }
        Ok(())
    }

    /// Write whole bytes. Unaligned output is shifted in bit by bit.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        if self.bits != 0 {
            for &byte in bytes {
                self.write_bits(byte as u32, 8)?;
            }
            return Ok(());
        }

        self.total_bits += bytes.len() as u64 * 8;
        if bytes.len() >= STAGING_CAPACITY {
            self.writer.write_all(&self.staged)?;
            self.staged.clear();
            self.writer.write_all(bytes)?;
            return Ok(());
        }
        self.staged.extend_from_slice(bytes);
        self.drain_if_full()
    }

    /// Pad the final byte, hand everything to the sink, flush it, and return it.
    pub fn finish(mut self) -> Result<W> {
        self.align_to_byte()?;
        self.writer.write_all(&self.staged)?;
        self.writer.flush()?;
        Ok(self.writer)
    }
}

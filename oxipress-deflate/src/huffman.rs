//! Canonical Huffman coding for DEFLATE.
//!
//! A canonical code is fully determined by its code lengths: codes of the
//! same length are consecutive integers assigned in symbol order, and
//! shorter codes come first (RFC 1951 Section 3.2.2). The encoder therefore
//! only has to transmit lengths, and both sides rebuild identical codes.
//!
//! - [`build_lengths`] turns symbol frequencies into length-limited lengths.
//! - [`canonical_codes`] assigns the codes, pre-reversed for LSB-first output.
//! - [`DecodeTable`] decodes symbols from a [`BitReader`].

use oxipress_core::error::{Corruption, FlateError, Result};
use oxipress_core::BitReader;
use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// Maximum code length in DEFLATE (15 bits).
pub const MAX_CODE_LENGTH: u8 = 15;

/// Maximum length for the code length alphabet (7 bits).
pub const MAX_CODELEN_LENGTH: u8 = 7;

/// A code ready to be written with `BitWriter::write_bits`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HuffmanCode {
    /// Code bits, reversed so the first transmitted bit is the LSB.
    pub bits: u16,
    /// Code length in bits; 0 for symbols without a code.
    pub length: u8,
}

/// Assign canonical codes to `lengths` (RFC 1951 Section 3.2.2).
pub fn canonical_codes(lengths: &[u8]) -> Vec<HuffmanCode> {
    let mut bl_count = [0u32; MAX_CODE_LENGTH as usize + 1];
    for &len in lengths {
        if len > 0 {
            bl_count[len as usize] += 1;
        }
    }

    let mut next_code = [0u32; MAX_CODE_LENGTH as usize + 1];
    let mut code = 0u32;
    for bits in 1..=MAX_CODE_LENGTH as usize {
        code = (code + bl_count[bits - 1]) << 1;
        next_code[bits] = code;
    }

    lengths
        .iter()
        .map(|&length| {
            if length == 0 {
                return HuffmanCode::default();
            }
            let code = next_code[length as usize] as u16;
            next_code[length as usize] += 1;
            HuffmanCode {
                bits: code.reverse_bits() >> (16 - length),
                length,
            }
        })
        .collect()
}

/// Compute code lengths for `freqs`, none longer than `max_length`.
///
/// Symbols with zero frequency get length 0. A lone used symbol gets length
/// 1. Otherwise lengths come from a Huffman tree; if the tree is deeper than
/// `max_length`, overlong leaves are moved up and the resulting excess in the
/// code space is paid back by pushing the deepest shorter leaves down one
/// level at a time, so the code stays complete.
pub fn build_lengths(freqs: &[u32], max_length: u8) -> Vec<u8> {
    let mut lengths = vec![0u8; freqs.len()];
    let used: Vec<usize> = (0..freqs.len()).filter(|&s| freqs[s] > 0).collect();

    match used.len() {
        0 => return lengths,
        1 => {
            lengths[used[0]] = 1;
            return lengths;
        }
        _ => {}
    }

    // Leaves are nodes 0..used.len(); internal nodes are appended after them,
    // so every parent has a higher index than its children.
    let mut parent = vec![usize::MAX; used.len()];
    let mut heap: BinaryHeap<Reverse<(u64, usize)>> = used
        .iter()
        .enumerate()
        .map(|(leaf, &symbol)| Reverse((freqs[symbol] as u64, leaf)))
        .collect();

    while let (Some(Reverse((wa, a))), Some(Reverse((wb, b)))) = (heap.pop(), heap.pop()) {
        let node = parent.len();
        parent.push(usize::MAX);
        parent[a] = node;
        parent[b] = node;
        heap.push(Reverse((wa + wb, node)));
    }

    let mut depth = vec![0usize; parent.len()];
    for node in (0..parent.len() - 1).rev() {
        depth[node] = depth[parent[node]] + 1;
    }

    let max = max_length as usize;
    let mut bl_count = vec![0u32; max + 1];
    for &d in &depth[..used.len()] {
        bl_count[d.min(max)] += 1;
    }

    let mut kraft: u64 = (1..=max)
        .map(|len| (bl_count[len] as u64) << (max - len))
        .sum();
    while kraft > 1u64 << max {
        bl_count[max] -= 1;
        if let Some(len) = (1..max).rev().find(|&len| bl_count[len] > 0) {
            bl_count[len] -= 1;
            bl_count[len + 1] += 2;
        }
        kraft -= 1;
    }

    // Most frequent symbols take the shortest codes.
    let mut by_weight = used;
    by_weight.sort_by_key(|&s| (Reverse(freqs[s]), s));
    let mut symbols = by_weight.into_iter();
    for len in 1..=max {
        for symbol in symbols.by_ref().take(bl_count[len] as usize) {
            lengths[symbol] = len as u8;
        }
    }

    lengths
}

/// Table-driven Huffman decoder.
///
/// Codes up to [`DecodeTable::FAST_BITS`] long are resolved with one lookup
/// indexed by the next input bits; longer codes fall back to a canonical
/// bit-by-bit walk over per-length code counts.
#[derive(Debug, Clone)]
pub struct DecodeTable {
    /// `(symbol, length)` per `fast_bits`-bit prefix; length 0 means "not here".
    fast: Vec<(u16, u8)>,
    /// Index width of `fast`.
    fast_bits: u8,
    /// Number of codes of each length.
    counts: [u16; MAX_CODE_LENGTH as usize + 1],
    /// Symbols ordered by (code length, symbol).
    symbols: Vec<u16>,
    /// Longest code length present.
    max_length: u8,
}

impl DecodeTable {
    /// Width of the direct lookup table.
    pub const FAST_BITS: u8 = 9;

    /// Build a decoder from code lengths.
    ///
    /// The lengths must describe a complete prefix code. The one exception
    /// is a single code of length 1, whose unused pattern fails at decode
    /// time. Over-subscribed and incomplete lengths are rejected.
    pub fn from_lengths(lengths: &[u8]) -> std::result::Result<Self, Corruption> {
        Self::build(lengths, false)
    }

    /// Build a distance decoder from code lengths.
    ///
    /// Same as [`DecodeTable::from_lengths`], except that a block using only
    /// literals may send no distance codes at all.
    pub fn from_distance_lengths(lengths: &[u8]) -> std::result::Result<Self, Corruption> {
        Self::build(lengths, true)
    }

    fn build(lengths: &[u8], allow_empty: bool) -> std::result::Result<Self, Corruption> {
        let mut counts = [0u16; MAX_CODE_LENGTH as usize + 1];
        for &len in lengths {
            if len > MAX_CODE_LENGTH {
                return Err(Corruption::CodeLengthTooLong(len));
            }
            counts[len as usize] += 1;
        }
        counts[0] = 0;

        let mut left = 1i32;
        for &count in &counts[1..] {
            left = (left << 1) - count as i32;
            if left < 0 {
                return Err(Corruption::OverSubscribed);
            }
        }
        let total: u16 = counts.iter().sum();
        let single_bit = total == 1 && counts[1] == 1;
        let empty = total == 0 && allow_empty;
        if left > 0 && !single_bit && !empty {
            return Err(Corruption::IncompleteCode);
        }

        let max_length = (1..=MAX_CODE_LENGTH)
            .rev()
            .find(|&len| counts[len as usize] > 0)
            .unwrap_or(0);

        let mut offsets = [0usize; MAX_CODE_LENGTH as usize + 2];
        for len in 1..=MAX_CODE_LENGTH as usize {
            offsets[len + 1] = offsets[len] + counts[len] as usize;
        }
        let mut symbols = vec![0u16; offsets[MAX_CODE_LENGTH as usize + 1]];
        for (symbol, &len) in lengths.iter().enumerate() {
            if len > 0 {
                symbols[offsets[len as usize]] = symbol as u16;
                offsets[len as usize] += 1;
            }
        }

        let fast_bits = Self::FAST_BITS.min(max_length);
        let mut fast = vec![(0u16, 0u8); 1 << fast_bits];
        for (symbol, code) in canonical_codes(lengths).into_iter().enumerate() {
            if code.length == 0 || code.length > fast_bits {
                continue;
            }
            let step = 1usize << code.length;
            for index in (code.bits as usize..fast.len()).step_by(step) {
                fast[index] = (symbol as u16, code.length);
            }
        }

        Ok(Self {
            fast,
            fast_bits,
            counts,
            symbols,
            max_length,
        })
    }

    /// Whether the table holds no codes at all.
    pub fn is_empty(&self) -> bool {
        self.max_length == 0
    }

    /// Decode one symbol.
    #[inline]
    pub fn decode(&self, reader: &mut BitReader<'_>) -> Result<u16> {
        let available = reader.available_bits();
        let (symbol, length) = self.fast[reader.peek_bits(self.fast_bits) as usize];
        if length > 0 {
            if length as u32 > available {
                return Err(Self::truncated(reader));
            }
            reader.consume(length)?;
            return Ok(symbol);
        }
        self.decode_slow(reader, available)
    }

    /// Canonical decoding, one code length at a time.
    fn decode_slow(&self, reader: &mut BitReader<'_>, available: u32) -> Result<u16> {
        let bits = reader.peek_bits(MAX_CODE_LENGTH);
        let mut code = 0i32;
        let mut first = 0i32;
        let mut index = 0i32;

        for len in 1..=self.max_length {
            code |= ((bits >> (len - 1)) & 1) as i32;
            let count = self.counts[len as usize] as i32;
            if code - first < count {
                if len as u32 > available {
                    return Err(Self::truncated(reader));
                }
                reader.consume(len)?;
                return Ok(self.symbols[(index + code - first) as usize]);
            }
            index += count;
            first = (first + count) << 1;
            code <<= 1;
        }

        if (self.max_length as u32) > available {
            return Err(Self::truncated(reader));
        }
        Err(FlateError::corrupt(
            reader.bit_position() / 8,
            Corruption::InvalidCode,
        ))
    }

    fn truncated(reader: &BitReader<'_>) -> FlateError {
        FlateError::corrupt(reader.bit_position() / 8, Corruption::UnexpectedEof)
    }
}

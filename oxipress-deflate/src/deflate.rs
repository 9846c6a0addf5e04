//! DEFLATE compression.
//!
//! Input is tokenized by the LZ77 [`MatchFinder`], the tokens are cut into
//! blocks, and each block is written in whichever of the three RFC 1951
//! encodings is smallest for it:
//!
//! - Stored (raw bytes, at most 65535 per block)
//! - Fixed Huffman codes
//! - Dynamic Huffman codes, with the code tables sent in the block header
//!
//! The last block carries BFINAL and every Huffman block ends with the
//! end-of-block symbol, so the stream is self-terminating.

use crate::huffman::{
    HuffmanCode, MAX_CODE_LENGTH, MAX_CODELEN_LENGTH, build_lengths, canonical_codes,
};
use crate::lz77::{MatchFinder, Token};
use crate::tables::{
    CODE_LENGTH_ORDER, CODELEN_SYMBOLS, DISTANCE_SYMBOLS, END_OF_BLOCK, LITLEN_SYMBOLS,
    distance_code, fixed_distance_lengths, fixed_litlen_lengths, length_code,
};
use oxipress_core::error::Result;
use oxipress_core::{BitWriter, CompressionLevel, Compressor};
use std::io::Write;
use std::sync::OnceLock;

/// Maximum number of tokens per Huffman block.
const BLOCK_TOKENS: usize = 16 * 1024;

/// Maximum payload of a stored block.
const MAX_STORED_BLOCK: usize = 65535;

/// Block encoding (the BTYPE field).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    /// BTYPE=00, raw bytes.
    Stored,
    /// BTYPE=01, fixed Huffman codes.
    Fixed,
    /// BTYPE=10, dynamic Huffman codes.
    Dynamic,
}

impl BlockKind {
    fn btype(self) -> u32 {
        match self {
            Self::Stored => 0b00,
            Self::Fixed => 0b01,
            Self::Dynamic => 0b10,
        }
    }
}

/// Summary of the last stream produced by a [`Deflater`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeflateStats {
    /// Uncompressed bytes consumed.
    pub input_bytes: u64,
    /// Compressed bytes produced.
    pub output_bytes: u64,
    /// Bytes emitted as literals or inside stored blocks.
    pub literals: u64,
    /// Back-references emitted.
    pub matches: u64,
    /// Stored blocks written.
    pub stored_blocks: u32,
    /// Fixed Huffman blocks written.
    pub fixed_blocks: u32,
    /// Dynamic Huffman blocks written.
    pub dynamic_blocks: u32,
}

impl DeflateStats {
    fn record_block(&mut self, kind: BlockKind) {
        match kind {
            BlockKind::Stored => self.stored_blocks += 1,
            BlockKind::Fixed => self.fixed_blocks += 1,
            BlockKind::Dynamic => self.dynamic_blocks += 1,
        }
    }
}

/// Symbol statistics of one block.
#[derive(Debug, Clone)]
struct Frequencies {
    litlen: [u32; LITLEN_SYMBOLS],
    distance: [u32; DISTANCE_SYMBOLS],
    /// Total length and distance extra bits.
    extra_bits: u64,
}

impl Frequencies {
    fn count(tokens: &[Token]) -> Self {
        let mut freqs = Self {
            litlen: [0; LITLEN_SYMBOLS],
            distance: [0; DISTANCE_SYMBOLS],
            extra_bits: 0,
        };
        for token in tokens {
            match *token {
                Token::Literal(byte) => freqs.litlen[byte as usize] += 1,
                Token::Match { length, distance } => {
                    let len = length_code(length);
                    let dist = distance_code(distance);
                    freqs.litlen[len.symbol as usize] += 1;
                    freqs.distance[dist.symbol as usize] += 1;
                    freqs.extra_bits += (len.extra_bits + dist.extra_bits) as u64;
                }
            }
        }
        freqs.litlen[END_OF_BLOCK as usize] += 1;
        freqs
    }

    /// Body size in bits under the given code lengths.
    fn body_bits(&self, litlen_lengths: &[u8], dist_lengths: &[u8]) -> u64 {
        let weighted = |freqs: &[u32], lengths: &[u8]| -> u64 {
            freqs
                .iter()
                .zip(lengths)
                .map(|(&f, &l)| f as u64 * l as u64)
                .sum()
        };
        weighted(&self.litlen, litlen_lengths) + weighted(&self.distance, dist_lengths) + self.extra_bits
    }
}

/// Extra bits carried by a code length alphabet symbol.
fn codelen_extra_bits(symbol: u8) -> u8 {
    match symbol {
        16 => 2,
        17 => 3,
        18 => 7,
        _ => 0,
    }
}

/// Number of entries up to and including the last non-zero one.
fn used_prefix(lengths: &[u8]) -> usize {
    lengths.iter().rposition(|&l| l != 0).map_or(0, |i| i + 1)
}

/// Run-length code a code length sequence into `(symbol, extra)` pairs.
///
/// 16 repeats the previous length 3-6 times, 17 and 18 emit 3-10 and
/// 11-138 zeros.
pub(crate) fn run_length_encode(lengths: &[u8]) -> Vec<(u8, u8)> {
    let mut runs = Vec::new();
    let mut i = 0;
    while i < lengths.len() {
        let value = lengths[i];
        let run = lengths[i..].iter().take_while(|&&l| l == value).count();
        let mut left = run;

        if value == 0 {
            while left >= 11 {
                let n = left.min(138);
                runs.push((18, (n - 11) as u8));
                left -= n;
            }
            if left >= 3 {
                runs.push((17, (left - 3) as u8));
                left = 0;
            }
        } else {
            runs.push((value, 0));
            left -= 1;
            while left >= 3 {
                let n = left.min(6);
                runs.push((16, (n - 3) as u8));
                left -= n;
            }
        }
        runs.extend(std::iter::repeat_n((value, 0), left));
        i += run;
    }
    runs
}

/// Everything a dynamic block header transmits.
#[derive(Debug, Clone)]
struct DynamicHeader {
    litlen_lengths: Vec<u8>,
    dist_lengths: Vec<u8>,
    /// HLIT + 257.
    literal_codes: usize,
    /// HDIST + 1.
    distance_codes: usize,
    codelen_lengths: Vec<u8>,
    /// HCLEN + 4.
    codelen_codes: usize,
    runs: Vec<(u8, u8)>,
}

impl DynamicHeader {
    fn new(freqs: &Frequencies) -> Self {
        let litlen_lengths = build_lengths(&freqs.litlen, MAX_CODE_LENGTH);

        // A block without matches still sends one distance code.
        let mut dist_freqs = freqs.distance;
        if dist_freqs.iter().all(|&f| f == 0) {
            dist_freqs[0] = 1;
        }
        let dist_lengths = build_lengths(&dist_freqs, MAX_CODE_LENGTH);

        let literal_codes = used_prefix(&litlen_lengths).max(257);
        let distance_codes = used_prefix(&dist_lengths).max(1);

        let mut combined = litlen_lengths[..literal_codes].to_vec();
        combined.extend_from_slice(&dist_lengths[..distance_codes]);
        let runs = run_length_encode(&combined);

        let mut codelen_freqs = [0u32; CODELEN_SYMBOLS];
        for &(symbol, _) in &runs {
            codelen_freqs[symbol as usize] += 1;
        }
        // Keep the code length code complete: some decoders reject a lone code.
        if codelen_freqs.iter().filter(|&&f| f > 0).count() < 2 {
            if let Some(slot) = codelen_freqs.iter_mut().find(|f| **f == 0) {
                *slot = 1;
            }
        }
        let codelen_lengths = build_lengths(&codelen_freqs, MAX_CODELEN_LENGTH);

        let codelen_codes = CODE_LENGTH_ORDER
            .iter()
            .rposition(|&symbol| codelen_lengths[symbol] != 0)
            .map_or(0, |i| i + 1)
            .max(4);

        Self {
            litlen_lengths,
            dist_lengths,
            literal_codes,
            distance_codes,
            codelen_lengths,
            codelen_codes,
            runs,
        }
    }

    /// Header size in bits, excluding the 3-bit block header.
    fn bits(&self) -> u64 {
        let table: u64 = self
            .runs
            .iter()
            .map(|&(symbol, _)| {
                (self.codelen_lengths[symbol as usize] + codelen_extra_bits(symbol)) as u64
            })
            .sum();
        5 + 5 + 4 + 3 * self.codelen_codes as u64 + table
    }

    fn write<W: Write>(&self, writer: &mut BitWriter<W>) -> Result<()> {
        writer.write_bits((self.literal_codes - 257) as u32, 5)?;
        writer.write_bits((self.distance_codes - 1) as u32, 5)?;
        writer.write_bits((self.codelen_codes - 4) as u32, 4)?;
        for &symbol in &CODE_LENGTH_ORDER[..self.codelen_codes] {
            writer.write_bits(self.codelen_lengths[symbol] as u32, 3)?;
        }

        let codes = canonical_codes(&self.codelen_lengths);
        for &(symbol, extra) in &self.runs {
            write_code(writer, codes[symbol as usize])?;
            writer.write_bits(extra as u32, codelen_extra_bits(symbol))?;
        }
        Ok(())
    }
}

/// Fixed literal/length and distance codes, built once.
fn fixed_codes() -> &'static (Vec<HuffmanCode>, Vec<HuffmanCode>) {
    static CODES: OnceLock<(Vec<HuffmanCode>, Vec<HuffmanCode>)> = OnceLock::new();
    CODES.get_or_init(|| {
        (
            canonical_codes(&fixed_litlen_lengths()),
            canonical_codes(&fixed_distance_lengths()),
        )
    })
}

#[inline]
fn write_code<W: Write>(writer: &mut BitWriter<W>, code: HuffmanCode) -> Result<()> {
    debug_assert!(code.length > 0, "Writing a symbol that has no code");
    writer.write_bits(code.bits as u32, code.length)
}

/// Write the tokens of one Huffman block followed by end-of-block.
fn write_body<W: Write>(
    writer: &mut BitWriter<W>,
    tokens: &[Token],
    litlen: &[HuffmanCode],
    distance: &[HuffmanCode],
) -> Result<()> {
    for token in tokens {
        match *token {
            Token::Literal(byte) => write_code(writer, litlen[byte as usize])?,
            Token::Match {
                length,
                distance: dist,
            } => {
                let len = length_code(length);
                write_code(writer, litlen[len.symbol as usize])?;
                writer.write_bits(len.extra as u32, len.extra_bits)?;

                let dist = distance_code(dist);
                write_code(writer, distance[dist.symbol as usize])?;
                writer.write_bits(dist.extra as u32, dist.extra_bits)?;
            }
        }
    }
    write_code(writer, litlen[END_OF_BLOCK as usize])
}

/// Exact size in bits of `len` raw bytes as stored blocks starting at `bit_pos`.
fn stored_bits(bit_pos: u64, len: usize) -> u64 {
    let mut pos = bit_pos;
    let mut remaining = len;
    loop {
        let chunk = remaining.min(MAX_STORED_BLOCK);
        pos = (pos + 3).div_ceil(8) * 8 + 32 + 8 * chunk as u64;
        remaining -= chunk;
        if remaining == 0 {
            return pos - bit_pos;
        }
    }
}

/// DEFLATE compressor.
#[derive(Debug)]
pub struct Deflater {
    /// Compression level.
    level: CompressionLevel,
    /// LZ77 match finder.
    finder: MatchFinder,
    /// Statistics of the last stream.
    stats: DeflateStats,
}

impl Deflater {
    /// Create a new DEFLATE compressor.
    pub fn new(level: CompressionLevel) -> Self {
        Self {
            level,
            finder: MatchFinder::new(level),
            stats: DeflateStats::default(),
        }
    }

    /// Compression level in use.
    pub fn level(&self) -> CompressionLevel {
        self.level
    }

    /// Statistics of the last stream produced.
    pub fn stats(&self) -> DeflateStats {
        self.stats
    }

    /// Compress `data` as one complete stream into `sink`.
    pub fn deflate_into<W: Write>(&mut self, data: &[u8], sink: W) -> Result<W> {
        self.stats = DeflateStats {
            input_bytes: data.len() as u64,
            ..DeflateStats::default()
        };
        let mut writer = BitWriter::new(sink);

        if self.level.is_store() {
            self.write_stored(&mut writer, data, true)?;
        } else {
            let tokens = self.finder.tokenize(data);
            let blocks: Vec<&[Token]> = if tokens.is_empty() {
                vec![&tokens[..]]
            } else {
                tokens.chunks(BLOCK_TOKENS).collect()
            };

            let mut offset = 0;
            for (index, block) in blocks.iter().enumerate() {
                let covered: usize = block.iter().map(Token::covered).sum();
                let raw = &data[offset..offset + covered];
                self.write_block(&mut writer, block, raw, index + 1 == blocks.len())?;
                offset += covered;
            }
        }

        self.stats.output_bytes = writer.bits_written().div_ceil(8);
        writer.finish()
    }

    /// Compress `data` to a new buffer.
    pub fn deflate(&mut self, data: &[u8]) -> Result<Vec<u8>> {
        self.deflate_into(data, Vec::new())
    }

    /// Write one block in its cheapest encoding.
    fn write_block<W: Write>(
        &mut self,
        writer: &mut BitWriter<W>,
        tokens: &[Token],
        raw: &[u8],
        is_final: bool,
    ) -> Result<()> {
        let freqs = Frequencies::count(tokens);
        let header = DynamicHeader::new(&freqs);

        let fixed_bits = 3 + freqs.body_bits(&fixed_litlen_lengths(), &fixed_distance_lengths());
        let dynamic_bits =
            3 + header.bits() + freqs.body_bits(&header.litlen_lengths, &header.dist_lengths);
        let stored_bits = stored_bits(writer.bits_written(), raw.len());

        if stored_bits < fixed_bits.min(dynamic_bits) {
            return self.write_stored(writer, raw, is_final);
        }

        for token in tokens {
            match token {
                Token::Literal(_) => self.stats.literals += 1,
                Token::Match { .. } => self.stats.matches += 1,
            }
        }

        if dynamic_bits < fixed_bits {
            writer.write_bit(is_final)?;
            writer.write_bits(BlockKind::Dynamic.btype(), 2)?;
            header.write(writer)?;
            let litlen = canonical_codes(&header.litlen_lengths);
            let distance = canonical_codes(&header.dist_lengths);
            write_body(writer, tokens, &litlen, &distance)?;
            self.stats.record_block(BlockKind::Dynamic);
        } else {
            writer.write_bit(is_final)?;
            writer.write_bits(BlockKind::Fixed.btype(), 2)?;
            let (litlen, distance) = fixed_codes();
            write_body(writer, tokens, litlen, distance)?;
            self.stats.record_block(BlockKind::Fixed);
        }
        Ok(())
    }

    /// Write raw bytes as one or more stored blocks.
    fn write_stored<W: Write>(
        &mut self,
        writer: &mut BitWriter<W>,
        raw: &[u8],
        is_final: bool,
    ) -> Result<()> {
        let chunks: Vec<&[u8]> = if raw.is_empty() {
            vec![raw]
        } else {
            raw.chunks(MAX_STORED_BLOCK).collect()
        };

        for (index, chunk) in chunks.iter().enumerate() {
            writer.write_bit(is_final && index + 1 == chunks.len())?;
            writer.write_bits(BlockKind::Stored.btype(), 2)?;
            writer.align_to_byte()?;

            let len = chunk.len() as u16;
            writer.write_bits(len as u32, 16)?;
            writer.write_bits(!len as u32, 16)?;
            writer.write_bytes(chunk)?;
            self.stats.record_block(BlockKind::Stored);
        }
        self.stats.literals += raw.len() as u64;
        Ok(())
    }
}

impl Default for Deflater {
    fn default() -> Self {
        Self::new(CompressionLevel::default())
    }
}

impl Compressor for Deflater {
    fn compress_into<W: Write>(&mut self, input: &[u8], sink: W) -> Result<W> {
        self.deflate_into(input, sink)
    }
}

/// Compress data using DEFLATE.
pub fn deflate(data: &[u8], level: CompressionLevel) -> Result<Vec<u8>> {
    Deflater::new(level).deflate(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inflate::inflate;

    #[test]
    fn test_empty_input_is_two_bytes() {
        let compressed = deflate(b"", CompressionLevel::BEST).unwrap();
        assert_eq!(compressed, vec![0x03, 0x00]);
        assert!(inflate(&compressed).unwrap().is_empty());
    }

    #[test]
    fn test_empty_stored() {
        let compressed = deflate(b"", CompressionLevel::NONE).unwrap();
        assert_eq!(compressed, vec![0x01, 0x00, 0x00, 0xFF, 0xFF]);
    }

    #[test]
    fn test_stored_level() {
        let input = b"Hello, World!";
        let compressed = deflate(input, CompressionLevel::NONE).unwrap();
        assert_eq!(compressed.len(), input.len() + 5);
        assert_eq!(&compressed[5..], input);
        assert_eq!(inflate(&compressed).unwrap(), input);
    }

    #[test]
    fn test_large_stored_splits() {
        let input: Vec<u8> = (0..200_000u32).map(|i| (i * 7 % 251) as u8).collect();
        let mut deflater = Deflater::new(CompressionLevel::NONE);
        let compressed = deflater.deflate(&input).unwrap();
        assert_eq!(deflater.stats().stored_blocks, 4);
        assert_eq!(compressed.len(), input.len() + 4 * 5);
        assert_eq!(inflate(&compressed).unwrap(), input);
    }

    #[test]
    fn test_block_choice() {
        let mut deflater = Deflater::new(CompressionLevel::BEST);

        deflater.deflate(&[0xAA; 1024]).unwrap();
        let stats = deflater.stats();
        assert_eq!(stats.stored_blocks, 0);
        assert_eq!(stats.input_bytes, 1024);
        assert!(stats.matches > 0);

        let text = b"It was the best of times, it was the worst of times, it was the age of \
                     wisdom, it was the age of foolishness, it was the epoch of belief, it was \
                     the epoch of incredulity, it was the season of Light, it was the season \
                     of Darkness, it was the spring of hope, it was the winter of despair.";
        let compressed = deflater.deflate(text).unwrap();
        assert_eq!(deflater.stats().output_bytes, compressed.len() as u64);
        assert_eq!(inflate(&compressed).unwrap(), text);
    }

    #[test]
    fn test_multiple_huffman_blocks() {
        // Noise yields roughly one token per byte, so several blocks of
        // BLOCK_TOKENS tokens are needed.
        let mut seed = 0x2545_F491u32;
        let input: Vec<u8> = (0..3 * BLOCK_TOKENS)
            .map(|_| {
                seed ^= seed << 13;
                seed ^= seed >> 17;
                seed ^= seed << 5;
                (seed >> 24) as u8
            })
            .collect();
        let mut deflater = Deflater::new(CompressionLevel::DEFAULT);
        let compressed = deflater.deflate(&input).unwrap();
        let stats = deflater.stats();
        assert!(stats.fixed_blocks + stats.dynamic_blocks + stats.stored_blocks >= 2);
        assert_eq!(inflate(&compressed).unwrap(), input);
    }

    #[test]
    fn test_run_length_encode() {
        let mut lengths = vec![0u8; 150];
        lengths.extend_from_slice(&[8, 8, 8, 8, 8, 8, 8, 8, 5, 5, 0, 0, 0, 0]);
        let runs = run_length_encode(&lengths);
        assert_eq!(
            runs,
            vec![
                (18, 127),
                (18, 1),
                (8, 0),
                (16, 3),
                (8, 0),
                (5, 0),
                (5, 0),
                (17, 1),
            ]
        );

        let expanded: usize = runs
            .iter()
            .map(|&(symbol, extra)| match symbol {
                16 => extra as usize + 3,
                17 => extra as usize + 3,
                18 => extra as usize + 11,
                _ => 1,
            })
            .sum();
        assert_eq!(expanded, lengths.len());
    }

    #[test]
    fn test_stored_bits_accounts_for_alignment() {
        assert_eq!(stored_bits(0, 0), 40);
        assert_eq!(stored_bits(5, 10), 3 + 32 + 80);
        assert_eq!(stored_bits(0, 70_000), 8 + 32 + 8 * 65535 + 8 + 32 + 8 * 4465);
    }

    #[test]
    fn test_compressor_trait() {
        let mut deflater = Deflater::default();
        assert_eq!(deflater.level(), CompressionLevel::DEFAULT);
        let compressed = Compressor::compress(&mut deflater, b"abcabcabcabc").unwrap();
        assert_eq!(inflate(&compressed).unwrap(), b"abcabcabcabc");
    }
}

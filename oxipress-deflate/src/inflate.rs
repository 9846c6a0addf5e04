//! DEFLATE decompression (inflate).
//!
//! Decodes one complete RFC 1951 stream held in memory. All three block
//! types are supported:
//! - Type 0: Stored (uncompressed)
//! - Type 1: Fixed Huffman codes
//! - Type 2: Dynamic Huffman codes
//!
//! Decoding either yields the whole output or fails; partial output is
//! never returned. The progress of the last run is observable through
//! [`Inflater::phase`].

use crate::huffman::DecodeTable;
use crate::tables::{
    CODE_LENGTH_ORDER, CODELEN_SYMBOLS, DISTANCE_BASE, DISTANCE_EXTRA_BITS, DISTANCE_SYMBOLS,
    END_OF_BLOCK, LENGTH_BASE, LENGTH_EXTRA_BITS, LITLEN_SYMBOLS, fixed_distance_lengths,
    fixed_litlen_lengths,
};
use oxipress_core::error::{Corruption, FlateError, Result};
use oxipress_core::{BitReader, Decompressor, OutputHistory};
use std::sync::OnceLock;

/// Where an [`Inflater`] is in the stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InflatePhase {
    /// Expecting a 3-bit block header (and the code tables of a dynamic block).
    ReadingHeader,
    /// Inside a block body.
    ReadingSymbols,
    /// A block body just ended.
    AtEndMarker,
    /// The final block ended and nothing followed it.
    Done,
    /// Decoding stopped on a defect.
    Failed {
        /// Byte offset in the compressed input where the defect was detected.
        offset: u64,
        /// What was wrong.
        corruption: Corruption,
    },
}

#[inline]
fn corrupt(reader: &BitReader<'_>, corruption: Corruption) -> FlateError {
    FlateError::corrupt(reader.bit_position() / 8, corruption)
}

/// Fixed literal/length and distance tables, built once.
fn fixed_tables() -> Result<&'static (DecodeTable, DecodeTable)> {
    type Tables = std::result::Result<(DecodeTable, DecodeTable), Corruption>;
    static TABLES: OnceLock<Tables> = OnceLock::new();
    TABLES
        .get_or_init(|| {
            Ok((
                DecodeTable::from_lengths(&fixed_litlen_lengths())?,
                DecodeTable::from_lengths(&fixed_distance_lengths())?,
            ))
        })
        .as_ref()
        .map_err(|corruption| FlateError::corrupt(0, corruption.clone()))
}

/// DEFLATE decompressor.
#[derive(Debug)]
pub struct Inflater {
    /// Decoded output, doubling as the back-reference window.
    history: OutputHistory,
    /// Progress through the current stream.
    phase: InflatePhase,
}

impl Inflater {
    /// Create a new DEFLATE decompressor.
    pub fn new() -> Self {
        Self {
            history: OutputHistory::deflate(),
            phase: InflatePhase::ReadingHeader,
        }
    }

    /// Current phase.
    pub fn phase(&self) -> &InflatePhase {
        &self.phase
    }

    /// Reset for a new stream.
    pub fn reset(&mut self) {
        self.history.clear();
        self.phase = InflatePhase::ReadingHeader;
    }

    /// Decompress `data`, which must hold exactly one stream.
    pub fn inflate(&mut self, data: &[u8]) -> Result<Vec<u8>> {
        let (output, consumed) = self.inflate_prefix(data)?;
        let trailing = data.len() - consumed;
        if trailing > 0 {
            let err = FlateError::corrupt(consumed as u64, Corruption::TrailingData(trailing));
            self.fail(&err);
            return Err(err);
        }
        Ok(output)
    }

    /// Decompress the stream at the front of `data`.
    ///
    /// Returns the output and the number of input bytes the stream occupied,
    /// counting the padding of its last byte. Bytes after that are ignored.
    pub fn inflate_prefix(&mut self, data: &[u8]) -> Result<(Vec<u8>, usize)> {
        self.reset();
        let mut reader = BitReader::new(data);
        if let Err(err) = self.inflate_blocks(&mut reader) {
            self.fail(&err);
            self.history.clear();
            return Err(err);
        }

        reader.align_to_byte();
        let output = std::mem::take(&mut self.history).into_output();
        Ok((output, reader.byte_position()))
    }

    fn fail(&mut self, err: &FlateError) {
        if let FlateError::CorruptStream { offset, corruption } = err {
            self.phase = InflatePhase::Failed {
                offset: *offset,
                corruption: corruption.clone(),
            };
        }
    }

    /// Decode blocks until the one marked final has ended.
    fn inflate_blocks(&mut self, reader: &mut BitReader<'_>) -> Result<()> {
        loop {
            self.phase = InflatePhase::ReadingHeader;
            let is_final = reader.read_bit()?;
            let btype = reader.read_bits(2)?;

            match btype {
                0 => self.inflate_stored(reader)?,
                1 => {
                    let (litlen, distance) = fixed_tables()?;
                    self.phase = InflatePhase::ReadingSymbols;
                    self.inflate_symbols(reader, litlen, distance)?;
                }
                2 => self.inflate_dynamic(reader)?,
                _ => return Err(corrupt(reader, Corruption::ReservedBlockType)),
            }

            self.phase = InflatePhase::AtEndMarker;
            if is_final {
                self.phase = InflatePhase::Done;
                return Ok(());
            }
        }
    }

    /// Decompress a stored (uncompressed) block.
    fn inflate_stored(&mut self, reader: &mut BitReader<'_>) -> Result<()> {
        reader.align_to_byte();
        let len = reader.read_bits(16)? as u16;
        let nlen = reader.read_bits(16)? as u16;
        if len != !nlen {
            return Err(corrupt(
                reader,
                Corruption::StoredLengthMismatch { len, nlen },
            ));
        }

        self.phase = InflatePhase::ReadingSymbols;
        let bytes = reader.read_aligned_bytes(len as usize)?;
        self.history.extend_literals(bytes);
        Ok(())
    }

    /// Read the code tables of a dynamic block, then decode its body.
    fn inflate_dynamic(&mut self, reader: &mut BitReader<'_>) -> Result<()> {
        let literal_codes = reader.read_bits(5)? as usize + 257;
        let distance_codes = reader.read_bits(5)? as usize + 1;
        let codelen_codes = reader.read_bits(4)? as usize + 4;
        if literal_codes > LITLEN_SYMBOLS || distance_codes > DISTANCE_SYMBOLS {
            return Err(corrupt(
                reader,
                Corruption::TooManyCodes {
                    literal_codes,
                    distance_codes,
                },
            ));
        }

        let mut codelen_lengths = [0u8; CODELEN_SYMBOLS];
        for &symbol in &CODE_LENGTH_ORDER[..codelen_codes] {
            codelen_lengths[symbol] = reader.read_bits(3)? as u8;
        }
        let codelen_table =
            DecodeTable::from_lengths(&codelen_lengths).map_err(|c| corrupt(reader, c))?;

        let mut lengths = vec![0u8; literal_codes + distance_codes];
        let mut filled = 0;
        while filled < lengths.len() {
            let symbol = codelen_table.decode(reader)?;
            let (value, repeat) = match symbol {
                0..=15 => {
                    lengths[filled] = symbol as u8;
                    filled += 1;
                    continue;
                }
                16 => {
                    if filled == 0 {
                        return Err(corrupt(reader, Corruption::RepeatWithoutPrevious));
                    }
                    (lengths[filled - 1], 3 + reader.read_bits(2)? as usize)
                }
                17 => (0, 3 + reader.read_bits(3)? as usize),
                _ => (0, 11 + reader.read_bits(7)? as usize),
            };
            if filled + repeat > lengths.len() {
                return Err(corrupt(reader, Corruption::CodeLengthOverflow));
            }
            lengths[filled..filled + repeat].fill(value);
            filled += repeat;
        }

        if lengths[END_OF_BLOCK as usize] == 0 {
            return Err(corrupt(reader, Corruption::MissingEndOfBlock));
        }
        let (litlen_lengths, dist_lengths) = lengths.split_at(literal_codes);
        let litlen = DecodeTable::from_lengths(litlen_lengths).map_err(|c| corrupt(reader, c))?;
        let distance =
            DecodeTable::from_distance_lengths(dist_lengths).map_err(|c| corrupt(reader, c))?;

        self.phase = InflatePhase::ReadingSymbols;
        self.inflate_symbols(reader, &litlen, &distance)
    }

    /// Decode literals and back-references up to end-of-block.
    fn inflate_symbols(
        &mut self,
        reader: &mut BitReader<'_>,
        litlen: &DecodeTable,
        distance: &DecodeTable,
    ) -> Result<()> {
        loop {
            let symbol = litlen.decode(reader)?;
            match symbol {
                0..=255 => self.history.push_literal(symbol as u8),
                END_OF_BLOCK => return Ok(()),
                257..=285 => {
                    let index = (symbol - 257) as usize;
                    let length = LENGTH_BASE[index] as usize
                        + reader.read_bits(LENGTH_EXTRA_BITS[index])? as usize;

                    let dist_symbol = distance.decode(reader)? as usize;
                    if dist_symbol >= DISTANCE_SYMBOLS {
                        return Err(corrupt(
                            reader,
                            Corruption::InvalidDistanceSymbol(dist_symbol as u16),
                        ));
                    }
                    let dist = DISTANCE_BASE[dist_symbol] as usize
                        + reader.read_bits(DISTANCE_EXTRA_BITS[dist_symbol])? as usize;

                    self.history
                        .copy_match(dist, length)
                        .map_err(|c| corrupt(reader, c))?;
                }
                _ => return Err(corrupt(reader, Corruption::InvalidLengthSymbol(symbol))),
            }
        }
    }
}

impl Default for Inflater {
    fn default() -> Self {
        Self::new()
    }
}

impl Decompressor for Inflater {
    fn decompress(&mut self, input: &[u8]) -> Result<Vec<u8>> {
        self.inflate(input)
    }

    fn reset(&mut self) {
        Inflater::reset(self);
    }

    fn is_finished(&self) -> bool {
        self.phase == InflatePhase::Done
    }
}

/// Decompress DEFLATE data.
pub fn inflate(data: &[u8]) -> Result<Vec<u8>> {
    Inflater::new().inflate(data)
}

/// Decompress the DEFLATE stream at the front of `data`, returning the
/// output and the number of bytes consumed.
pub fn inflate_prefix(data: &[u8]) -> Result<(Vec<u8>, usize)> {
    Inflater::new().inflate_prefix(data)
}

//! Alphabet tables for DEFLATE (RFC 1951 Section 3.2.5 and 3.2.6).
//!
//! Match lengths 3-258 map onto literal/length symbols 257-285 and distances
//! 1-32768 onto distance symbols 0-29, each symbol followed by a fixed
//! number of extra bits.

/// Size of the literal/length alphabet actually usable (0-285).
pub const LITLEN_SYMBOLS: usize = 286;

/// Size of the literal/length alphabet including the two reserved symbols.
pub const LITLEN_ALPHABET: usize = 288;

/// Size of the distance alphabet actually usable (0-29).
pub const DISTANCE_SYMBOLS: usize = 30;

/// Size of the distance alphabet including the two reserved symbols.
pub const DISTANCE_ALPHABET: usize = 32;

/// Size of the code length alphabet (0-18).
pub const CODELEN_SYMBOLS: usize = 19;

/// End-of-block symbol.
pub const END_OF_BLOCK: u16 = 256;

/// Base length for symbols 257-285.
pub const LENGTH_BASE: [u16; 29] = [
    3, 4, 5, 6, 7, 8, 9, 10, 11, 13, 15, 17, 19, 23, 27, 31, 35, 43, 51, 59, 67, 83, 99, 115, 131,
    163, 195, 227, 258,
];

/// Extra bits for symbols 257-285.
pub const LENGTH_EXTRA_BITS: [u8; 29] = [
    0, 0, 0, 0, 0, 0, 0, 0, 1, 1, 1, 1, 2, 2, 2, 2, 3, 3, 3, 3, 4, 4, 4, 4, 5, 5, 5, 5, 0,
];

/// Base distance for symbols 0-29.
pub const DISTANCE_BASE: [u16; 30] = [
    1, 2, 3, 4, 5, 7, 9, 13, 17, 25, 33, 49, 65, 97, 129, 193, 257, 385, 513, 769, 1025, 1537,
    2049, 3073, 4097, 6145, 8193, 12289, 16385, 24577,
];

/// Extra bits for distance symbols 0-29.
pub const DISTANCE_EXTRA_BITS: [u8; 30] = [
    0, 0, 0, 0, 1, 1, 2, 2, 3, 3, 4, 4, 5, 5, 6, 6, 7, 7, 8, 8, 9, 9, 10, 10, 11, 11, 12, 12, 13,
    13,
];

/// Transmission order of code length code lengths in a dynamic header.
pub const CODE_LENGTH_ORDER: [usize; 19] = [
    16, 17, 18, 0, 8, 7, 9, 6, 10, 5, 11, 4, 12, 3, 13, 2, 14, 1, 15,
];

/// A symbol together with the extra bits that refine it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymbolCode {
    /// Alphabet symbol.
    pub symbol: u16,
    /// Number of extra bits following the symbol.
    pub extra_bits: u8,
    /// Value of the extra bits.
    pub extra: u16,
}

/// Map a match length (3-258) to its literal/length symbol.
pub fn length_code(length: u16) -> SymbolCode {
    debug_assert!((3..=258).contains(&length), "Length out of range: {length}");
    let index = LENGTH_BASE.partition_point(|&base| base <= length) - 1;
    SymbolCode {
        symbol: 257 + index as u16,
        extra_bits: LENGTH_EXTRA_BITS[index],
        extra: length - LENGTH_BASE[index],
    }
}

/// Map a distance (1-32768) to its distance symbol.
pub fn distance_code(distance: u16) -> SymbolCode {
    debug_assert!(
        (1..=32768).contains(&distance),
        "Distance out of range: {distance}"
    );
    let index = DISTANCE_BASE.partition_point(|&base| base <= distance) - 1;
    SymbolCode {
        symbol: index as u16,
        extra_bits: DISTANCE_EXTRA_BITS[index],
        extra: distance - DISTANCE_BASE[index],
    }
}

/// Fixed literal/length code lengths (RFC 1951 Section 3.2.6).
pub const fn fixed_litlen_lengths() -> [u8; LITLEN_ALPHABET] {
    let mut lengths = [8u8; LITLEN_ALPHABET];
    let mut symbol = 144;
    while symbol < 256 {
        lengths[symbol] = 9;
        symbol += 1;
    }
    while symbol < 280 {
        lengths[symbol] = 7;
        symbol += 1;
    }
    lengths
}

/// Fixed distance code lengths: all 32 symbols use 5 bits.
pub const fn fixed_distance_lengths() -> [u8; DISTANCE_ALPHABET] {
    [5u8; DISTANCE_ALPHABET]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_litlen_lengths() {
        let lengths = fixed_litlen_lengths();
        assert_eq!(lengths[0], 8);
        assert_eq!(lengths[143], 8);
        assert_eq!(lengths[144], 9);
        assert_eq!(lengths[255], 9);
        assert_eq!(lengths[256], 7);
        assert_eq!(lengths[279], 7);
        assert_eq!(lengths[280], 8);
        assert_eq!(lengths[287], 8);
    }

    #[test]
    fn test_length_codes_cover_range() {
        for length in 3..=258u16 {
            let code = length_code(length);
            let index = (code.symbol - 257) as usize;
            assert!(code.extra < (1 << code.extra_bits).max(1), "length {length}");
            assert_eq!(LENGTH_BASE[index] + code.extra, length);
        }
    }

    #[test]
    fn test_specific_lengths() {
        let code = |l| {
            let c = length_code(l);
            (c.symbol, c.extra_bits, c.extra)
        };
        assert_eq!(code(3), (257, 0, 0));
        assert_eq!(code(10), (264, 0, 0));
        assert_eq!(code(12), (265, 1, 1));
        assert_eq!(code(257), (284, 5, 30));
        assert_eq!(code(258), (285, 0, 0));
    }

    #[test]
    fn test_distance_codes() {
        for distance in 1..=32768u16 {
            let code = distance_code(distance);
            assert_eq!(DISTANCE_BASE[code.symbol as usize] + code.extra, distance);
            assert!((code.extra as u32) < (1u32 << code.extra_bits).max(1));
        }
        let last = distance_code(32768);
        assert_eq!((last.symbol, last.extra_bits, last.extra), (29, 13, 8191));
        assert_eq!(distance_code(5).symbol, 4);
    }
}

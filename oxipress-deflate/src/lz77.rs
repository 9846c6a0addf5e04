//! LZ77 match finding for DEFLATE.
//!
//! The encoder walks the input once, looking up earlier occurrences of the
//! next three bytes through hash chains and emitting either a literal or a
//! `(length, distance)` back-reference into the previous 32 KB.
//!
//! # Algorithm
//!
//! - `head[h]` holds the most recent position whose 3-byte prefix hashes to
//!   `h`; `prev[p % WINDOW_SIZE]` links position `p` to the previous one with
//!   the same hash. Chains are therefore ordered newest to oldest.
//! - Positions are inserted lazily, right before a search, so a chain only
//!   ever contains positions strictly before the one being matched.
//! - At lazy levels a match is deferred by one byte when the next position
//!   offers a longer one, in which case a literal is emitted instead.

use oxipress_core::CompressionLevel;

/// Maximum window size for DEFLATE (32KB).
pub const WINDOW_SIZE: usize = 32768;

/// Minimum match length.
pub const MIN_MATCH: usize = 3;

/// Maximum match length.
pub const MAX_MATCH: usize = 258;

const WINDOW_MASK: usize = WINDOW_SIZE - 1;

const HASH_BITS: u32 = 15;

const HASH_SIZE: usize = 1 << HASH_BITS;

/// Length-3 matches farther than this cost more bits than three literals.
const TOO_FAR: usize = 4096;

/// Empty chain slot.
const NIL: usize = usize::MAX;

/// A token produced by LZ77 match finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    /// A literal byte.
    Literal(u8),
    /// A back-reference to previously seen data.
    Match {
        /// Number of bytes to copy (3-258).
        length: u16,
        /// Distance back into the window (1-32768).
        distance: u16,
    },
}

impl Token {
    /// Number of input bytes this token stands for.
    pub fn covered(&self) -> usize {
        match self {
            Self::Literal(_) => 1,
            Self::Match { length, .. } => *length as usize,
        }
    }
}

/// Search effort for one compression level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchParams {
    /// Once the current match is this long, the lazy search uses a quarter chain.
    pub good_length: usize,
    /// Matches this long are taken without a lazy look-ahead.
    pub max_lazy: usize,
    /// Stop walking a chain once a match is this long.
    pub nice_length: usize,
    /// Maximum chain entries examined per search.
    pub max_chain: usize,
    /// Whether to defer matches by one byte when that pays off.
    pub lazy: bool,
}

impl MatchParams {
    /// Parameters for `level`, following the classic zlib tuning table.
    pub fn for_level(level: CompressionLevel) -> Self {
        let (good_length, max_lazy, nice_length, max_chain, lazy) = match level.level() {
            0 => (0, 0, 0, 0, false),
            1 => (4, 4, 8, 4, false),
            2 => (4, 5, 16, 8, false),
            3 => (4, 6, 32, 32, false),
            4 => (4, 4, 16, 16, true),
            5 => (8, 16, 32, 32, true),
            6 => (8, 16, 128, 128, true),
            7 => (8, 32, 128, 256, true),
            8 => (32, 128, 258, 1024, true),
            _ => (32, 258, 258, 4096, true),
        };
        Self {
            good_length,
            max_lazy,
            nice_length,
            max_chain,
            lazy,
        }
    }
}

/// Hash-chain match finder.
#[derive(Debug, Clone)]
pub struct MatchFinder {
    params: MatchParams,
    /// Most recent position for each hash.
    head: Vec<usize>,
    /// Previous position with the same hash, indexed by position mod window.
    prev: Vec<usize>,
    /// Next position to be inserted into the chains.
    next_insert: usize,
}

impl MatchFinder {
    /// Create a match finder tuned for `level`.
    pub fn new(level: CompressionLevel) -> Self {
        Self {
            params: MatchParams::for_level(level),
            head: vec![NIL; HASH_SIZE],
            prev: vec![NIL; WINDOW_SIZE],
            next_insert: 0,
        }
    }

    /// Search parameters in use.
    pub fn params(&self) -> MatchParams {
        self.params
    }

    /// Forget all previously seen input.
    pub fn reset(&mut self) {
        self.head.fill(NIL);
        self.prev.fill(NIL);
        self.next_insert = 0;
    }

    #[inline(always)]
    fn hash(data: &[u8], pos: usize) -> usize {
        let key = u32::from(data[pos])
            | u32::from(data[pos + 1]) << 8
            | u32::from(data[pos + 2]) << 16;
        (key.wrapping_mul(0x9E37_79B1) >> (32 - HASH_BITS)) as usize
    }

    fn insert_until(&mut self, data: &[u8], end: usize) {
        while self.next_insert < end {
            let pos = self.next_insert;
            if pos + MIN_MATCH <= data.len() {
                let h = Self::hash(data, pos);
                self.prev[pos & WINDOW_MASK] = self.head[h];
                self.head[h] = pos;
            }
            self.next_insert += 1;
        }
    }

    /// Longest match at `pos` that is longer than `min_len`, as
    /// `(length, distance)`.
    fn longest_match(
        &mut self,
        data: &[u8],
        pos: usize,
        chain_limit: usize,
        min_len: usize,
    ) -> Option<(usize, usize)> {
        if pos + MIN_MATCH > data.len() {
            return None;
        }
        self.insert_until(data, pos);

        let max_len = (data.len() - pos).min(MAX_MATCH);
        if min_len >= max_len {
            return None;
        }
        let target = &data[pos..pos + max_len];

        let mut best_len = min_len;
        let mut best_dist = 0;
        let mut candidate = self.head[Self::hash(data, pos)];
        let mut chain = chain_limit;

        while candidate != NIL && chain > 0 {
            let distance = pos - candidate;
            if distance > WINDOW_SIZE {
                break;
            }

            // Cheap rejection: a longer match must agree at `best_len`.
            if data[candidate + best_len] == target[best_len] {
                let len = data[candidate..]
                    .iter()
                    .zip(target)
                    .take_while(|(a, b)| a == b)
                    .count();
                if len > best_len {
                    best_len = len;
                    best_dist = distance;
                    if len >= self.params.nice_length || len == max_len {
                        break;
                    }
                }
            }

            let older = self.prev[candidate & WINDOW_MASK];
            if older == NIL || older >= candidate {
                break;
            }
            candidate = older;
            chain -= 1;
        }

        if best_dist == 0 || best_len < MIN_MATCH || (best_len == MIN_MATCH && best_dist > TOO_FAR)
        {
            return None;
        }
        Some((best_len, best_dist))
    }

    /// Turn `data` into tokens. Any state from a previous call is discarded.
    pub fn tokenize(&mut self, data: &[u8]) -> Vec<Token> {
        self.reset();
        let params = self.params;
        let mut tokens = Vec::with_capacity(data.len() / 2 + 1);
        let mut pos = 0;

        while pos < data.len() {
            let Some((length, distance)) =
                self.longest_match(data, pos, params.max_chain, MIN_MATCH - 1)
            else {
                tokens.push(Token::Literal(data[pos]));
                pos += 1;
                continue;
            };

            if params.lazy && length < params.max_lazy {
                let chain = if length >= params.good_length {
                    params.max_chain >> 2
                } else {
                    params.max_chain
                };
                if self.longest_match(data, pos + 1, chain, length).is_some() {
                    tokens.push(Token::Literal(data[pos]));
                    pos += 1;
                    continue;
                }
            }

            tokens.push(Token::Match {
                length: length as u16,
                distance: distance as u16,
            });
            pos += length;
        }

        tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenize(data: &[u8], level: u8) -> Vec<Token> {
        MatchFinder::new(CompressionLevel::new(level)).tokenize(data)
    }

    fn expand(tokens: &[Token]) -> Vec<u8> {
        let mut output = Vec::new();
        for token in tokens {
            match *token {
                Token::Literal(b) => output.push(b),
                Token::Match { length, distance } => {
                    for _ in 0..length {
                        output.push(output[output.len() - distance as usize]);
                    }
                }
            }
        }
        output
    }

    fn noise(len: usize, mut seed: u32) -> Vec<u8> {
        (0..len)
            .map(|_| {
                seed = seed.wrapping_mul(1103515245).wrapping_add(12345);
                (seed >> 16) as u8
            })
            .collect()
    }

    #[test]
    fn test_literals_only() {
        let tokens = tokenize(b"abcdefgh", 6);
        assert!(tokens.iter().all(|t| matches!(t, Token::Literal(_))));
        assert_eq!(tokens.len(), 8);
    }

    #[test]
    fn test_repeated_byte_run() {
        let input = vec![0xAAu8; 1024];
        let tokens = tokenize(&input, 9);
        assert_eq!(tokens[0], Token::Literal(0xAA));
        assert_eq!(
            tokens[1],
            Token::Match {
                length: 258,
                distance: 1
            }
        );
        assert!(tokens.len() <= 6);
        assert_eq!(expand(&tokens), input);
    }

    #[test]
    fn test_reconstruct_all_levels() {
        let mut input = b"Hello, Hello, Hello! The quick brown fox, the quick brown dog.".to_vec();
        input.extend_from_slice(&noise(300, 7));
        input.extend_from_slice(b"Hello, Hello, quick brown");

        for level in 0..=9 {
            let tokens = tokenize(&input, level);
            assert_eq!(expand(&tokens), input, "level {level}");
            assert_eq!(tokens.iter().map(Token::covered).sum::<usize>(), input.len());
        }
    }

    #[test]
    fn test_level_0_has_no_matches() {
        let tokens = tokenize(b"test data test data", 0);
        assert!(tokens.iter().all(|t| matches!(t, Token::Literal(_))));
    }

    #[test]
    fn test_distances_stay_in_window() {
        let pattern = b"PATTERN_TO_MATCH_0123456789";
        let mut input = pattern.to_vec();
        input.extend_from_slice(&noise(40_000, 99));
        input.extend_from_slice(pattern);

        let tokens = tokenize(&input, 9);
        for token in &tokens {
            if let Token::Match { distance, length } = token {
                assert!((1..=WINDOW_SIZE as u16).contains(distance));
                assert!((MIN_MATCH as u16..=MAX_MATCH as u16).contains(length));
            }
        }
        assert_eq!(expand(&tokens), input);
    }

    #[test]
    fn test_far_short_match_dropped() {
        let mut input = b"xyz".to_vec();
        input.extend_from_slice(&noise(5000, 3));
        input.extend_from_slice(b"xyz");

        let tokens = tokenize(&input, 9);
        let tail = &tokens[tokens.len() - 3..];
        assert!(tail.iter().all(|t| matches!(t, Token::Literal(_))));
    }

    #[test]
    fn test_reuse_resets_state() {
        let mut finder = MatchFinder::new(CompressionLevel::BEST);
        let first = finder.tokenize(b"abcabcabcabc");
        let second = finder.tokenize(b"abcabcabcabc");
        assert_eq!(first, second);
        assert_eq!(finder.params(), MatchParams::for_level(CompressionLevel::BEST));
    }
}

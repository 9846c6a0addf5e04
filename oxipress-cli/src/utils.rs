//! Utility functions for the CLI.

use oxipress_deflate::DeflateStats;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Extension of compressed files.
pub const DEFLATE_EXTENSION: &str = "deflate";

/// `compressed` as a percentage of `original`; 0 for empty input.
pub fn percent_of(compressed: usize, original: usize) -> f64 {
    if original == 0 {
        0.0
    } else {
        compressed as f64 / original as f64 * 100.0
    }
}

/// Space saved by compression, in percent of `original`; 0 for empty input.
///
/// Negative when the output grew.
pub fn reduction_of(compressed: usize, original: usize) -> f64 {
    if original == 0 {
        0.0
    } else {
        100.0 - percent_of(compressed, original)
    }
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

/// Default output of `compress`: `<input>.deflate`.
pub fn compressed_path(input: &Path) -> PathBuf {
    with_suffix(input, ".deflate")
}

/// Default output of `decompress`: strip `.deflate`, else append `.out`.
pub fn decompressed_path(input: &Path) -> PathBuf {
    if input.extension().is_some_and(|ext| ext == DEFLATE_EXTENSION) {
        input.with_extension("")
    } else {
        with_suffix(input, ".out")
    }
}

/// Print the block and token breakdown of a compressed stream.
pub fn print_stats(stats: &DeflateStats) {
    println!(
        "  Blocks: {} stored, {} fixed, {} dynamic",
        stats.stored_blocks, stats.fixed_blocks, stats.dynamic_blocks
    );
    println!(
        "  Tokens: {} literals, {} matches",
        stats.literals, stats.matches
    );
}

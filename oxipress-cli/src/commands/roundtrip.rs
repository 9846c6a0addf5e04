//! Roundtrip command implementation.

use crate::utils::{percent_of, print_stats};
use oxipress_core::CompressionLevel;
use oxipress_deflate::{DeflateStats, Deflater, decompress};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Block counts of the compressed stream.
#[derive(Debug, Serialize)]
struct BlockCounts {
    stored: u32,
    fixed: u32,
    dynamic: u32,
}

/// JSON serializable result of a round trip.
#[derive(Debug, Serialize)]
pub struct RoundTripReport {
    file: String,
    level: u8,
    original_size: usize,
    compressed_size: usize,
    ratio: f64,
    verified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    blocks: BlockCounts,
    #[serde(skip)]
    stats: DeflateStats,
}

impl RoundTripReport {
    /// Compress `data`, decompress the result, and compare.
    ///
    /// A decoding failure is recorded in the report rather than returned.
    pub fn run(
        file: &str,
        data: &[u8],
        level: CompressionLevel,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let mut deflater = Deflater::new(level);
        let compressed = deflater.deflate(data)?;
        let stats = deflater.stats();

        let (verified, error) = match decompress(&compressed) {
            Ok(output) if output == data => (true, None),
            Ok(_) => (false, Some("decompressed output differs".to_string())),
            Err(e) => (false, Some(e.to_string())),
        };

        Ok(Self {
            file: file.to_string(),
            level: level.level(),
            original_size: data.len(),
            compressed_size: compressed.len(),
            ratio: percent_of(compressed.len(), data.len()) / 100.0,
            verified,
            error,
            blocks: BlockCounts {
                stored: stats.stored_blocks,
                fixed: stats.fixed_blocks,
                dynamic: stats.dynamic_blocks,
            },
            stats,
        })
    }

    /// Whether the output matched the input.
    pub fn verified(&self) -> bool {
        self.verified
    }
}

pub fn cmd_roundtrip(
    input: &Path,
    level: CompressionLevel,
    json: bool,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let data = fs::read(input)?;
    let report = RoundTripReport::run(&input.display().to_string(), &data, level)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Round trip of {} (level {})", report.file, report.level);
        println!("  Original size: {} bytes", report.original_size);
        println!(
            "  Compressed size: {} bytes ({:.1}% of original)",
            report.compressed_size,
            report.ratio * 100.0
        );
        if verbose {
            print_stats(&report.stats);
        }
        match &report.error {
            None => println!("  Verified: OK"),
            Some(e) => println!("  Verified: FAILED ({})", e),
        }
    }

    if !report.verified() {
        std::process::exit(2);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_for_repetitive_input() {
        let data = b"abcabcabc".repeat(200);
        let report = RoundTripReport::run("mem", &data, CompressionLevel::BEST).unwrap();
        assert!(report.verified());
        assert_eq!(report.original_size, data.len());
        assert!(report.ratio < 0.1);
        assert!(report.error.is_none());
    }

    #[test]
    fn test_report_json_shape() {
        let report = RoundTripReport::run("empty.bin", b"", CompressionLevel::NONE).unwrap();
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["file"], "empty.bin");
        assert_eq!(value["level"], 0);
        assert_eq!(value["compressed_size"], 5);
        assert_eq!(value["verified"], true);
        assert_eq!(value["blocks"]["stored"], 1);
        assert!(value.get("error").is_none());
        assert!(value.get("stats").is_none());
    }
}

//! Demo command implementation.

use crate::utils::{percent_of, print_stats, reduction_of};
use oxipress_core::CompressionLevel;
use oxipress_deflate::{Deflater, decompress};

/// Sentence repeated to build the default payload.
pub const DEMO_TEXT: &str =
    "The highest function of ecology is the understanding of consequences.";

/// Options for the demo command.
pub struct DemoOptions {
    pub text: Option<String>,
    pub repeat: usize,
    pub level: CompressionLevel,
    pub quiet: bool,
    pub verbose: bool,
}

pub fn cmd_demo(options: DemoOptions) -> Result<(), Box<dyn std::error::Error>> {
    let unit = options.text.as_deref().unwrap_or(DEMO_TEXT);
    let original = unit.repeat(options.repeat).into_bytes();

    let mut deflater = Deflater::new(options.level);
    let compressed = deflater.deflate(&original)?;
    let decompressed = decompress(&compressed)?;

    println!("Original size: {} bytes", original.len());
    println!(
        "Compressed size: {} bytes ({:.1}% of original)",
        compressed.len(),
        percent_of(compressed.len(), original.len())
    );
    println!(
        "Reduction: {:.2}%",
        reduction_of(compressed.len(), original.len())
    );
    if options.verbose {
        print_stats(&deflater.stats());
    }
    if !options.quiet {
        println!("Original: {}", String::from_utf8_lossy(&original));
        println!("Decompressed: {}", String::from_utf8_lossy(&decompressed));
    }

    if decompressed != original {
        return Err("decompressed output differs from the original".into());
    }
    println!();
    println!("Compression/decompression successful!");

    if compressed.len() >= original.len() {
        println!();
        println!("Compression didn't reduce size - try with:");
        println!("- Larger input data");
        println!("- More repetitive content");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(text: Option<&str>, repeat: usize) -> DemoOptions {
        DemoOptions {
            text: text.map(str::to_string),
            repeat,
            level: CompressionLevel::BEST,
            quiet: true,
            verbose: false,
        }
    }

    #[test]
    fn test_demo_verifies_round_trip() {
        assert!(cmd_demo(options(None, 100)).is_ok());
        assert!(cmd_demo(options(Some("x"), 1)).is_ok());
        assert!(cmd_demo(options(Some(""), 0)).is_ok());
    }
}

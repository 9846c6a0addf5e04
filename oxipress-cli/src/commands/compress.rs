//! Compress command implementation.

use crate::utils::{compressed_path, percent_of, print_stats};
use oxipress_core::CompressionLevel;
use oxipress_deflate::Deflater;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

pub fn cmd_compress(
    input: &Path,
    output: Option<PathBuf>,
    level: CompressionLevel,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let data = fs::read(input)?;
    let output = output.unwrap_or_else(|| compressed_path(input));

    let mut deflater = Deflater::new(level);
    let sink = BufWriter::new(File::create(&output)?);
    deflater.deflate_into(&data, sink)?;

    let stats = deflater.stats();
    println!(
        "{} -> {} ({} -> {} bytes, {:.1}%)",
        input.display(),
        output.display(),
        stats.input_bytes,
        stats.output_bytes,
        percent_of(stats.output_bytes as usize, data.len())
    );
    if verbose {
        println!("  Level: {}", level);
        print_stats(&stats);
    }

    Ok(())
}

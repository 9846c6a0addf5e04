//! Decompress command implementation.

use crate::utils::decompressed_path;
use oxipress_deflate::decompress;
use std::fs;
use std::path::{Path, PathBuf};

pub fn cmd_decompress(
    input: &Path,
    output: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let data = fs::read(input)?;
    let output = output.unwrap_or_else(|| decompressed_path(input));

    let decompressed = decompress(&data)?;
    fs::write(&output, &decompressed)?;

    println!(
        "{} -> {} ({} -> {} bytes)",
        input.display(),
        output.display(),
        data.len(),
        decompressed.len()
    );
    Ok(())
}

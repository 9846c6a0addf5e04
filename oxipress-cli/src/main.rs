//! oxipress CLI - raw DEFLATE compression from the command line.
//!
//! Compresses and decompresses RFC 1951 streams, verifies round trips, and
//! runs the classic demonstration payload.

mod commands;
mod utils;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use commands::demo::DemoOptions;
use commands::{cmd_compress, cmd_decompress, cmd_demo, cmd_roundtrip};
use oxipress_core::CompressionLevel;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "oxipress")]
#[command(author, version, about = "Pure Rust DEFLATE (RFC 1951) compressor")]
#[command(long_about = "
oxipress reads and writes raw DEFLATE streams (RFC 1951): no zlib or gzip
framing, no checksum. Decompression rejects truncated streams and any bytes
after the final block.

Examples:
  oxipress demo
  oxipress demo --text 'abc' --repeat 1000 -l 6
  oxipress compress notes.txt
  oxipress decompress notes.txt.deflate -o restored.txt
  oxipress roundtrip image.bmp --json
  oxipress completions bash
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

fn parse_level(value: &str) -> Result<CompressionLevel, String> {
    match value.parse::<u8>() {
        Ok(level) if level <= 9 => Ok(CompressionLevel::new(level)),
        _ => Err(format!("invalid level '{}': expected 0-9", value)),
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Compress and decompress a repeated sentence, printing sizes
    Demo {
        /// Sentence to repeat (defaults to a line about ecology)
        #[arg(short, long)]
        text: Option<String>,

        /// Number of repetitions
        #[arg(short, long, default_value_t = 100)]
        repeat: usize,

        /// Compression level (0-9)
        #[arg(short, long, value_parser = parse_level, default_value = "9")]
        level: CompressionLevel,

        /// Do not print the payload texts
        #[arg(short, long)]
        quiet: bool,

        /// Show block-level details
        #[arg(short, long)]
        verbose: bool,
    },

    /// Compress a file to a raw DEFLATE stream
    #[command(alias = "c")]
    Compress {
        /// File to compress
        input: PathBuf,

        /// Output file (default: <input>.deflate)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Compression level (0-9)
        #[arg(short, long, value_parser = parse_level, default_value = "9")]
        level: CompressionLevel,

        /// Show block-level details
        #[arg(short, long)]
        verbose: bool,
    },

    /// Decompress a raw DEFLATE stream
    #[command(alias = "d")]
    Decompress {
        /// File to decompress
        input: PathBuf,

        /// Output file (default: input without .deflate, else <input>.out)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Compress, decompress, and compare a file
    #[command(alias = "t")]
    Roundtrip {
        /// File to check
        input: PathBuf,

        /// Compression level (0-9)
        #[arg(short, long, value_parser = parse_level, default_value = "9")]
        level: CompressionLevel,

        /// Output as JSON (machine-readable)
        #[arg(short, long)]
        json: bool,

        /// Show block-level details
        #[arg(short, long)]
        verbose: bool,
    },

    /// Generate a shell completion script
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Demo {
            text,
            repeat,
            level,
            quiet,
            verbose,
        } => cmd_demo(DemoOptions {
            text,
            repeat,
            level,
            quiet,
            verbose,
        }),
        Commands::Compress {
            input,
            output,
            level,
            verbose,
        } => cmd_compress(&input, output, level, verbose),
        Commands::Decompress { input, output } => cmd_decompress(&input, output),
        Commands::Roundtrip {
            input,
            level,
            json,
            verbose,
        } => cmd_roundtrip(&input, level, json, verbose),
        Commands::Completions { shell } => {
            clap_complete::generate(
                shell,
                &mut Cli::command(),
                "oxipress",
                &mut std::io::stdout(),
            );
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

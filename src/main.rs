//! CLI entry point for the image-to-particle-cloud sampling tool

use clap::Parser;
use pixelcloud::io::cli::{Cli, FileProcessor};

fn main() -> pixelcloud::Result<()> {
    let cli = Cli::parse();
    let mut processor = FileProcessor::new(cli)?;
    processor.process()
}

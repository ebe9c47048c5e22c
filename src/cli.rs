use clap::Parser;
use std::path::PathBuf;

/// Asynchronous file sorter by extension.
///
/// Every file found below SOURCE_DIR is copied into OUTPUT_DIR/<EXTENSION>/,
/// with files lacking an extension collected in OUTPUT_DIR/NO_EXTENSION/.
#[derive(Debug, Parser)]
#[command(version)]
pub struct Args {
    /// Path to the source folder for reading files.
    pub source_dir: PathBuf,
    /// Path to the output folder for creating subdirectories.
    pub output_dir: PathBuf,
}

// kpathsea-cli/src/models/cli.rs
use clap::{ArgAction, Parser};
use kpathsea_core::FileFormat;
use std::path::PathBuf;

/// kpsefind: locate TeX files with kpsewhich.
/// Prints the full path of each file that was found, one per line.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase message verbosity.
    ///
    /// Specify multiple times for more verbose output:
    ///  -v:  INFO level
    ///  -vv: DEBUG level
    ///  -vvv: TRACE level (most verbose)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Read configuration from this file instead of searching for Kpathsea.toml.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Directory containing the kpsewhich executable.
    #[arg(long, value_name = "DIR")]
    pub tex_path: Option<PathBuf>,

    /// File format to search, e.g. tfm, sty, "opentype fonts" (default: all).
    #[arg(short, long, value_name = "FORMAT")]
    pub format: Option<FileFormat>,

    /// Kill kpsewhich if a lookup takes longer than this many seconds.
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,

    /// Wait for kpsewhich on the main thread instead of the async runtime.
    #[arg(long)]
    pub blocking: bool,

    /// Files to look up, in order.
    #[arg(required = true, value_name = "FILE")]
    pub files: Vec<String>,
}

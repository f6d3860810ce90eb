//! Command-line interface definitions.
//!
//! All CLI arguments, subcommands, and options using the clap derive API,
//! with global options (verbosity, quiet, JSON errors) and one subcommand
//! per workflow.
//!
//! # Example
//!
//! ```bash
//! # Find duplicate groups within one tree
//! mediadupe scan ~/Pictures/incoming
//!
//! # Plan a consolidation of incoming media into the canonical library
//! mediadupe plan ~/Pictures/incoming ~/Pictures/library
//!
//! # Machine-readable output for scripting
//! mediadupe plan ~/incoming ~/library --output json
//!
//! # Verbose mode for debugging
//! mediadupe -v scan ~/Pictures/incoming
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Progressive media deduplication engine.
///
/// Finds byte-identical media files (photos, video, audio, RAW formats)
/// with minimal I/O, and plans the consolidation of a source tree into a
/// canonical library.
#[derive(Debug, Parser)]
#[command(name = "mediadupe")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Report fatal errors as JSON on stderr
    #[arg(long, global = true)]
    pub json_errors: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Find duplicate file groups within one directory tree
    Scan(ScanArgs),
    /// Plan consolidation of a source tree into a target library
    Plan(PlanArgs),
}

/// Arguments for the scan subcommand.
#[derive(Debug, Args)]
pub struct ScanArgs {
    /// Directory tree to scan for duplicates
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    #[command(flatten)]
    pub filters: FilterArgs,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

/// Arguments for the plan subcommand.
#[derive(Debug, Args)]
pub struct PlanArgs {
    /// Source tree with incoming media
    #[arg(value_name = "SOURCE")]
    pub source: PathBuf,

    /// Canonical library tree
    #[arg(value_name = "TARGET")]
    pub target: PathBuf,

    #[command(flatten)]
    pub filters: FilterArgs,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

/// Scan filtering options shared by all subcommands.
#[derive(Debug, Args)]
pub struct FilterArgs {
    /// Minimum file size to consider (e.g., 1KB, 1MB, 1GB)
    ///
    /// Supports suffixes: B, KB, KiB, MB, MiB, GB, GiB, TB, TiB
    #[arg(long, value_name = "SIZE", value_parser = parse_size)]
    pub min_size: Option<u64>,

    /// Maximum file size to consider (e.g., 1GB)
    #[arg(long, value_name = "SIZE", value_parser = parse_size)]
    pub max_size: Option<u64>,

    /// Only consider recognized media files (photo/video/audio)
    #[arg(long)]
    pub media_only: bool,

    /// Follow symbolic links during scan
    ///
    /// Warning: May cause infinite loops if symlinks form cycles.
    #[arg(long)]
    pub follow_symlinks: bool,

    /// Include hidden files and directories
    #[arg(long)]
    pub include_hidden: bool,

    /// Number of I/O threads for hashing
    #[arg(long, value_name = "N", env = "MEDIADUPE_IO_THREADS")]
    pub io_threads: Option<usize>,
}

/// Output format for results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable report
    Text,
    /// Machine-readable JSON for scripting
    Json,
}

/// Parse a human-friendly size string into bytes.
///
/// # Arguments
///
/// * `s` - Size string like "1024", "4KB", "1.5GiB"
///
/// # Errors
///
/// Returns a descriptive message for empty, negative, or malformed input.
pub fn parse_size(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("Size cannot be empty".to_string());
    }

    // Find where the number ends and the suffix begins
    let (num_str, suffix) = match s.find(|c: char| !c.is_ascii_digit() && c != '.') {
        Some(idx) => (&s[..idx], s[idx..].trim().to_uppercase()),
        None => (s, String::new()),
    };

    let num: f64 = num_str
        .parse()
        .map_err(|_| format!("Invalid number: '{num_str}'"))?;

    if num < 0.0 {
        return Err("Size cannot be negative".to_string());
    }

    let multiplier: u64 = match suffix.as_str() {
        "" | "B" => 1,
        "KB" => 1_000,
        "KIB" => 1 << 10,
        "MB" => 1_000_000,
        "MIB" => 1 << 20,
        "GB" => 1_000_000_000,
        "GIB" => 1 << 30,
        "TB" => 1_000_000_000_000,
        "TIB" => 1 << 40,
        other => return Err(format!("Unknown size suffix: '{other}'")),
    };

    Ok((num * multiplier as f64) as u64)
}

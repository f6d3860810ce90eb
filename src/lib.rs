//! mediadupe - Progressive Media Deduplication Engine
//!
//! A Rust library and CLI for deduplicating large media collections
//! (photos, video, audio, including RAW/BRAW formats) across a source and
//! a target directory tree. Byte-identical files are identified with
//! minimal I/O: files are bucketed by exact size, then contested buckets
//! are read at logarithmically growing depths until every file is proven
//! unique or confirmed duplicate.
//!
//! # Pipeline
//!
//! 1. [`scanner`]: walk directory trees into flat file metadata
//! 2. [`resolver`]: progressive-uniqueness resolution over size buckets
//! 3. [`duplicates`]: group confirmed duplicates by content signature
//! 4. [`coordinator`]: orchestration and move-candidate classification

pub mod cli;
pub mod config;
pub mod coordinator;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod resolver;
pub mod scanner;
pub mod signal;

use std::io::Write;
use std::sync::Arc;

use anyhow::Result;

use cli::{Cli, Commands, FilterArgs, OutputFormat};
use config::Config;
use coordinator::{ConsolidationReport, CoordinatorConfig, ProcessingCoordinator};
use error::ExitCode;
use progress::Progress;
use resolver::ResolveConfig;
use scanner::WalkerConfig;
use signal::ShutdownHandler;

/// Run the application with parsed CLI arguments.
///
/// Returns the exit code the process should terminate with; hard failures
/// (bad roots, broken output streams) surface as errors for `main` to
/// report.
///
/// # Errors
///
/// Fails if a scan root is missing or not a directory, or if writing the
/// report fails.
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);
    let handler = signal::install_handler()?;
    let config = Config::load();

    let report = match &cli.command {
        Commands::Scan(args) => {
            let coordinator = build_coordinator(&config, &args.filters, cli.quiet, &handler);
            coordinator.analyze(&args.path)?
        }
        Commands::Plan(args) => {
            let coordinator = build_coordinator(&config, &args.filters, cli.quiet, &handler);
            coordinator.plan(&args.source, &args.target)?
        }
    };

    let format = match &cli.command {
        Commands::Scan(args) => args.output,
        Commands::Plan(args) => args.output,
    };
    emit(&report, format)
}

/// Merge persisted defaults with CLI filter flags into a coordinator.
fn build_coordinator(
    config: &Config,
    filters: &FilterArgs,
    quiet: bool,
    handler: &ShutdownHandler,
) -> ProcessingCoordinator {
    let walker = WalkerConfig {
        follow_symlinks: filters.follow_symlinks || config.follow_symlinks,
        skip_hidden: !filters.include_hidden && config.skip_hidden,
        min_size: filters.min_size.or(config.min_size),
        max_size: filters.max_size,
        media_only: filters.media_only || config.media_only,
    };
    let resolve = ResolveConfig::default()
        .with_io_threads(filters.io_threads.unwrap_or(config.io_threads))
        .with_shutdown_flag(handler.get_flag())
        .with_progress_callback(Arc::new(Progress::new(quiet)));

    ProcessingCoordinator::new(CoordinatorConfig { walker, resolve })
}

/// Render the report and derive the exit code.
fn emit(report: &ConsolidationReport, format: OutputFormat) -> Result<ExitCode> {
    let exit_code = ExitCode::from_report(report);
    match format {
        OutputFormat::Text => {
            let stdout = std::io::stdout();
            output::write_text(report, stdout.lock())?;
        }
        OutputFormat::Json => {
            let json = output::JsonOutput::new(report, exit_code).to_json_pretty()?;
            let stdout = std::io::stdout();
            writeln!(stdout.lock(), "{json}")?;
        }
    }
    Ok(exit_code)
}

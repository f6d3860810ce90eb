//! Output formatters for pipeline results.
//!
//! Two renderings of a [`ConsolidationReport`]:
//! - text for humans, with human-readable sizes;
//! - JSON for automation and scripting.
//!
//! # JSON Schema
//!
//! ```json
//! {
//!   "to_move": [
//!     {"id": 3, "path": "/incoming/IMG_0001.CR3", "size": 31457280,
//!      "kind": "photo", "created": "2024-06-01T10:22:33Z"}
//!   ],
//!   "duplicates": [
//!     {"size": 1048576, "signature": "ab12...", "wasted_space": 1048576,
//!      "in_target": true,
//!      "files": [{"id": 1, "path": "...", "origin": "source", ...}]}
//!   ],
//!   "errors": [{"path": "/incoming/bad.mov", "message": "..."}],
//!   "summary": { ... }
//! }
//! ```

use std::io::Write;

use bytesize::ByteSize;
use serde::Serialize;

use crate::coordinator::{ConsolidationReport, MoveCandidate, ReportError};
use crate::duplicates::DuplicateGroup;
use crate::error::ExitCode;

/// One duplicate group in JSON form.
#[derive(Debug, Serialize)]
struct JsonGroup<'a> {
    size: u64,
    signature: &'a str,
    wasted_space: u64,
    in_target: bool,
    files: &'a [crate::duplicates::GroupMember],
}

/// Run summary in JSON form.
#[derive(Debug, Serialize)]
struct JsonSummary {
    files_scanned: usize,
    bytes_scanned: u64,
    media_files: usize,
    scan_errors: usize,
    size_buckets: usize,
    multi_file_buckets: usize,
    unique_files: usize,
    duplicate_files: usize,
    excluded_files: usize,
    chunk_hashes: u64,
    bytes_hashed: u64,
    duplicate_groups: usize,
    reclaimable_bytes: u64,
    files_to_move: usize,
    interrupted: bool,
    exit_code: i32,
}

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    to_move: &'a [MoveCandidate],
    duplicates: Vec<JsonGroup<'a>>,
    errors: &'a [ReportError],
    summary: JsonSummary,
}

/// JSON formatter for a consolidation report.
pub struct JsonOutput<'a> {
    report: &'a ConsolidationReport,
    exit_code: ExitCode,
}

impl<'a> JsonOutput<'a> {
    /// Create a JSON formatter.
    #[must_use]
    pub fn new(report: &'a ConsolidationReport, exit_code: ExitCode) -> Self {
        Self { report, exit_code }
    }

    fn build(&self) -> JsonReport<'a> {
        let report = self.report;
        JsonReport {
            to_move: &report.to_move,
            duplicates: report
                .groups
                .iter()
                .map(|g: &DuplicateGroup| JsonGroup {
                    size: g.size,
                    signature: &g.signature,
                    wasted_space: g.wasted_space(),
                    in_target: g.has_target_copy(),
                    files: &g.files,
                })
                .collect(),
            errors: &report.errors,
            summary: JsonSummary {
                files_scanned: report.scan.files_scanned,
                bytes_scanned: report.scan.bytes_scanned,
                media_files: report.scan.media_files,
                scan_errors: report.scan.scan_errors,
                size_buckets: report.resolve.total_buckets,
                multi_file_buckets: report.resolve.multi_file_buckets,
                unique_files: report.resolve.unique_files,
                duplicate_files: report.resolve.duplicate_files,
                excluded_files: report.resolve.excluded_files,
                chunk_hashes: report.resolve.chunk_hashes,
                bytes_hashed: report.resolve.bytes_hashed,
                duplicate_groups: report.grouping.groups,
                reclaimable_bytes: report.grouping.wasted_bytes,
                files_to_move: report.to_move.len(),
                interrupted: report.interrupted,
                exit_code: self.exit_code.as_i32(),
            },
        }
    }

    /// Render compact JSON.
    ///
    /// # Errors
    ///
    /// Fails only if serialization itself fails.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.build())
    }

    /// Render pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Fails only if serialization itself fails.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.build())
    }
}

/// Write the human-readable report.
///
/// # Errors
///
/// Propagates I/O errors from the writer.
pub fn write_text(report: &ConsolidationReport, mut out: impl Write) -> std::io::Result<()> {
    writeln!(
        out,
        "Scanned {} files ({}), {} media",
        report.scan.files_scanned,
        ByteSize::b(report.scan.bytes_scanned),
        report.scan.media_files
    )?;
    writeln!(
        out,
        "Resolved {} size buckets ({} contested); hashed {} ({:.1}% of files settled by size alone)",
        report.resolve.total_buckets,
        report.resolve.multi_file_buckets,
        ByteSize::b(report.resolve.bytes_hashed),
        report.resolve.size_elimination_rate()
    )?;

    if report.groups.is_empty() {
        writeln!(out, "\nNo duplicate groups found.")?;
    } else {
        writeln!(
            out,
            "\n{} duplicate groups, {} reclaimable:",
            report.grouping.groups,
            ByteSize::b(report.grouping.wasted_bytes)
        )?;
        for group in &report.groups {
            writeln!(
                out,
                "  [{} x {}]{}",
                group.len(),
                ByteSize::b(group.size),
                if group.has_target_copy() {
                    " (already in target)"
                } else {
                    ""
                }
            )?;
            for member in &group.files {
                writeln!(out, "    {}", member.path.display())?;
            }
        }
    }

    if !report.to_move.is_empty() {
        writeln!(out, "\n{} files to move into the target:", report.to_move.len())?;
        for candidate in &report.to_move {
            writeln!(
                out,
                "  {} ({}, {})",
                candidate.path.display(),
                ByteSize::b(candidate.size),
                candidate.created.format("%Y-%m-%d")
            )?;
        }
    }

    if !report.errors.is_empty() {
        writeln!(out, "\n{} files could not be processed:", report.errors.len())?;
        for error in &report.errors {
            writeln!(out, "  {}", error.message)?;
        }
    }

    if report.interrupted {
        writeln!(out, "\nRun was interrupted; unlisted files are unresolved.")?;
    }

    Ok(())
}

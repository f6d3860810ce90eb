//! Pipeline orchestration: scan → resolve → group → classify.
//!
//! # Overview
//!
//! [`ProcessingCoordinator`] wires the collaborators together for the two
//! supported workflows:
//!
//! - [`analyze`](ProcessingCoordinator::analyze): find duplicate groups
//!   within a single tree;
//! - [`plan`](ProcessingCoordinator::plan): resolve a source tree against a
//!   canonical target tree and classify which unique source files still
//!   need to be moved over.
//!
//! The coordinator performs no hashing itself and holds no ambient state;
//! every result is an explicit return value. Physical move/delete
//! operations belong to external collaborators, which call
//! [`SizeIndex::remove`] after each successful operation.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::duplicates::{group_duplicates, DuplicateGroup, GroupingStats};
use crate::resolver::{resolve, FileRecord, RecordId, ResolveConfig, ResolveStats, Resolution, SizeIndex};
use crate::scanner::{FileMeta, MediaKind, Origin, ScanError, Walker, WalkerConfig};

/// Configuration for a coordinator run.
#[derive(Debug, Clone, Default)]
pub struct CoordinatorConfig {
    /// Directory walking options (applied to both trees)
    pub walker: WalkerConfig,
    /// Resolution engine options
    pub resolve: ResolveConfig,
}

/// Statistics from the scan phase.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScanStats {
    /// Files accepted into the index
    pub files_scanned: usize,
    /// Total bytes across accepted files
    pub bytes_scanned: u64,
    /// Accepted files with a recognized media format
    pub media_files: usize,
    /// Entries that could not be read during traversal
    pub scan_errors: usize,
}

/// A unique source file whose content is absent from the target tree.
#[derive(Debug, Clone, Serialize)]
pub struct MoveCandidate {
    /// Stable record identity
    pub id: RecordId,
    /// Absolute path in the source tree
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
    /// Media classification
    pub kind: MediaKind,
    /// Best available capture-adjacent timestamp, for date bucketing by
    /// the external move collaborator
    pub created: DateTime<Utc>,
}

/// A non-fatal problem encountered during the run.
#[derive(Debug, Clone, Serialize)]
pub struct ReportError {
    /// Path the problem occurred on, when known
    pub path: Option<PathBuf>,
    /// Human-readable description
    pub message: String,
}

/// Everything a UI or batch driver needs from one run.
#[derive(Debug)]
pub struct ConsolidationReport {
    /// Unique source files to move into the target
    pub to_move: Vec<MoveCandidate>,
    /// Byte-identical file groups
    pub groups: Vec<DuplicateGroup>,
    /// Non-fatal errors encountered (scan and hashing)
    pub errors: Vec<ReportError>,
    /// Scan phase counters
    pub scan: ScanStats,
    /// Resolution phase counters
    pub resolve: ResolveStats,
    /// Grouping phase counters
    pub grouping: GroupingStats,
    /// Whether the run was cut short by cancellation
    pub interrupted: bool,
}

impl ConsolidationReport {
    /// Whether any duplicate groups were found.
    #[must_use]
    pub fn has_duplicates(&self) -> bool {
        !self.groups.is_empty()
    }

    /// Whether the run completed with non-fatal errors.
    #[must_use]
    pub fn is_partial(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Orchestrates the deduplication pipeline.
#[derive(Debug, Default)]
pub struct ProcessingCoordinator {
    config: CoordinatorConfig,
}

impl ProcessingCoordinator {
    /// Create a coordinator with the given configuration.
    #[must_use]
    pub fn new(config: CoordinatorConfig) -> Self {
        Self { config }
    }

    /// Create a coordinator with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::default()
    }

    /// Scan one directory tree into a flat list of file drafts.
    ///
    /// Traversal is delegated to the [`Walker`]; per-entry errors are
    /// collected, not fatal.
    ///
    /// # Errors
    ///
    /// Fails only if the root itself is missing or not a directory.
    pub fn scan(&self, root: &Path) -> Result<(Vec<FileMeta>, Vec<ScanError>), ScanError> {
        if !root.exists() {
            return Err(ScanError::NotFound(root.to_path_buf()));
        }
        if !root.is_dir() {
            return Err(ScanError::NotADirectory(root.to_path_buf()));
        }

        let mut walker = Walker::new(root, self.config.walker.clone());
        if let Some(ref flag) = self.config.resolve.shutdown_flag {
            walker = walker.with_shutdown_flag(flag.clone());
        }

        let mut files = Vec::new();
        let mut errors = Vec::new();
        for entry in walker.walk() {
            match entry {
                Ok(meta) => {
                    if let Some(ref callback) = self.config.resolve.progress_callback {
                        callback.on_progress(files.len() + 1, &meta.path.to_string_lossy());
                    }
                    files.push(meta);
                }
                Err(e) => {
                    log::warn!("Scan error: {e}");
                    errors.push(e);
                }
            }
        }
        log::info!(
            "Scanned {}: {} files, {} errors",
            root.display(),
            files.len(),
            errors.len()
        );
        Ok((files, errors))
    }

    /// Find duplicate groups within a single tree.
    ///
    /// # Errors
    ///
    /// Fails only if the root is missing or not a directory; everything
    /// else is reported inside the returned [`ConsolidationReport`].
    pub fn analyze(&self, root: &Path) -> Result<ConsolidationReport, ScanError> {
        let mut index = SizeIndex::new();
        let mut report_errors = Vec::new();
        let scan = self.scan_into(&mut index, root, Origin::Source, &mut report_errors)?;
        Ok(self.finish(index, scan, report_errors, false))
    }

    /// Resolve a source tree against the canonical target tree.
    ///
    /// Both trees are merged into one index and resolved as a single pool,
    /// so a source file byte-identical to a target file lands in a
    /// duplicate group with it, and a unique source file is proven absent
    /// from the target.
    ///
    /// # Errors
    ///
    /// Fails only if either root is missing or not a directory.
    pub fn plan(&self, source: &Path, target: &Path) -> Result<ConsolidationReport, ScanError> {
        let mut index = SizeIndex::new();
        let mut report_errors = Vec::new();

        if let Some(ref callback) = self.config.resolve.progress_callback {
            callback.on_message("Scanning source tree");
        }
        let mut scan = self.scan_into(&mut index, source, Origin::Source, &mut report_errors)?;

        if let Some(ref callback) = self.config.resolve.progress_callback {
            callback.on_message("Scanning target tree");
        }
        let target_scan = self.scan_into(&mut index, target, Origin::Target, &mut report_errors)?;
        scan.files_scanned += target_scan.files_scanned;
        scan.bytes_scanned += target_scan.bytes_scanned;
        scan.media_files += target_scan.media_files;
        scan.scan_errors += target_scan.scan_errors;

        Ok(self.finish(index, scan, report_errors, true))
    }

    /// Scan one tree and insert the drafts into the index.
    fn scan_into(
        &self,
        index: &mut SizeIndex,
        root: &Path,
        origin: Origin,
        report_errors: &mut Vec<ReportError>,
    ) -> Result<ScanStats, ScanError> {
        if let Some(ref callback) = self.config.resolve.progress_callback {
            callback.on_phase_start("scan", 0);
        }
        let result = self.scan(root);
        if let Some(ref callback) = self.config.resolve.progress_callback {
            callback.on_phase_end("scan");
        }
        let (files, errors) = result?;

        let mut stats = ScanStats {
            files_scanned: files.len(),
            scan_errors: errors.len(),
            ..Default::default()
        };
        for meta in files {
            stats.bytes_scanned += meta.size;
            if meta.kind.is_media() {
                stats.media_files += 1;
            }
            index.insert(meta, origin);
        }
        report_errors.extend(errors.iter().map(|e| ReportError {
            path: None,
            message: e.to_string(),
        }));
        Ok(stats)
    }

    /// Run resolution and grouping, then assemble the report.
    fn finish(
        &self,
        mut index: SizeIndex,
        scan: ScanStats,
        mut report_errors: Vec<ReportError>,
        classify_moves: bool,
    ) -> ConsolidationReport {
        let resolve_stats = resolve(&mut index, &self.config.resolve);
        report_errors.extend(resolve_stats.errors.iter().map(|e| ReportError {
            path: Some(e.path().to_path_buf()),
            message: e.to_string(),
        }));

        let (groups, grouping) = group_duplicates(&index);

        let to_move = if classify_moves {
            let present = target_presence(&groups);
            files_to_move(&index, |record| present.contains(&record.id()))
                .into_iter()
                .map(|record| MoveCandidate {
                    id: record.id(),
                    path: record.path.clone(),
                    size: record.size,
                    kind: record.kind,
                    created: DateTime::<Utc>::from(record.created),
                })
                .collect()
        } else {
            Vec::new()
        };

        ConsolidationReport {
            to_move,
            groups,
            errors: report_errors,
            scan,
            interrupted: resolve_stats.interrupted,
            resolve: resolve_stats,
            grouping,
        }
    }
}

/// Unique source-tree records whose content the predicate does not find in
/// the target.
///
/// The predicate answers "does content equivalent to this record already
/// exist at the target?". The standard predicate comes from
/// [`target_presence`] over the current duplicate groups; callers with
/// external knowledge (a database of prior imports, say) can supply their
/// own. Unresolved records are never move candidates: their content is
/// unknown.
pub fn files_to_move<'a, F>(index: &'a SizeIndex, already_in_target: F) -> Vec<&'a FileRecord>
where
    F: Fn(&FileRecord) -> bool,
{
    let mut candidates: Vec<&FileRecord> = index
        .records()
        .filter(|r| r.origin == Origin::Source)
        .filter(|r| r.resolution() == Resolution::Unique)
        .filter(|r| !already_in_target(r))
        .collect();
    candidates.sort_by(|a, b| a.path.cmp(&b.path));
    candidates
}

/// Source-record ids whose duplicate group already includes a target copy.
#[must_use]
pub fn target_presence(groups: &[DuplicateGroup]) -> HashSet<RecordId> {
    let mut present = HashSet::new();
    for group in groups {
        if group.has_target_copy() {
            present.extend(
                group
                    .files
                    .iter()
                    .filter(|f| f.origin == Origin::Source)
                    .map(|f| f.id),
            );
        }
    }
    present
}

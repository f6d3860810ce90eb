//! Directory walker implementation using jwalk for parallel traversal.
//!
//! # Overview
//!
//! This module provides the [`Walker`] struct for traversing a directory
//! tree and collecting [`FileMeta`] drafts for the resolution engine.
//! It uses [`jwalk`] for parallel directory walking.
//!
//! The deduplication core itself never traverses directories; it only
//! consumes the flat stream this walker (or any other collaborator)
//! produces.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::SystemTime;

use jwalk::WalkDir;

use super::{FileMeta, ScanError, WalkerConfig};

/// Directory walker for parallel file discovery.
///
/// Supports filtering by size, hidden status, and media classification.
#[derive(Debug)]
pub struct Walker {
    /// Root path to walk
    root: PathBuf,
    /// Walker configuration
    config: WalkerConfig,
    /// Optional shutdown flag for graceful termination
    shutdown_flag: Option<Arc<AtomicBool>>,
}

impl Walker {
    /// Create a new walker for the given path.
    ///
    /// # Arguments
    ///
    /// * `path` - Root directory to scan
    /// * `config` - Walker configuration options
    #[must_use]
    pub fn new(path: &Path, config: WalkerConfig) -> Self {
        Self {
            root: path.to_path_buf(),
            config,
            shutdown_flag: None,
        }
    }

    /// Set the shutdown flag for graceful termination.
    ///
    /// When the flag is set to `true`, the walker stops iteration as soon
    /// as possible.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Check if shutdown has been requested.
    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    /// Check if a file passes size filters.
    fn passes_size_filter(&self, size: u64) -> bool {
        if let Some(min) = self.config.min_size {
            if size < min {
                return false;
            }
        }
        if let Some(max) = self.config.max_size {
            if size > max {
                return false;
            }
        }
        true
    }

    /// Walk the directory tree, yielding file metadata drafts.
    ///
    /// Errors on individual entries are yielded as [`ScanError`] values
    /// rather than stopping iteration; the caller decides whether to
    /// collect or report them.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use mediadupe::scanner::{Walker, WalkerConfig};
    /// use std::path::Path;
    ///
    /// let walker = Walker::new(Path::new("."), WalkerConfig::default());
    /// let files: Vec<_> = walker.walk().filter_map(Result::ok).collect();
    /// println!("Found {} files", files.len());
    /// ```
    pub fn walk(&self) -> impl Iterator<Item = Result<FileMeta, ScanError>> + '_ {
        let walk_dir = WalkDir::new(&self.root)
            .follow_links(self.config.follow_symlinks)
            .skip_hidden(self.config.skip_hidden)
            .process_read_dir(move |_depth, _path, _read_dir_state, children| {
                // Sort children for deterministic output
                children.sort_by(|a, b| match (a, b) {
                    (Ok(a), Ok(b)) => a.file_name().cmp(b.file_name()),
                    (Ok(_), Err(_)) => std::cmp::Ordering::Less,
                    (Err(_), Ok(_)) => std::cmp::Ordering::Greater,
                    (Err(_), Err(_)) => std::cmp::Ordering::Equal,
                });
            });

        walk_dir.into_iter().filter_map(move |entry_result| {
            if self.is_shutdown_requested() {
                log::debug!("Walker: shutdown requested, stopping iteration");
                return None;
            }

            let entry = match entry_result {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e.path().map(Path::to_path_buf).unwrap_or_default();
                    return Some(Err(match e.io_error() {
                        Some(io) if io.kind() == std::io::ErrorKind::PermissionDenied => {
                            ScanError::PermissionDenied(path)
                        }
                        Some(io) if io.kind() == std::io::ErrorKind::NotFound => {
                            ScanError::NotFound(path)
                        }
                        _ => ScanError::Io {
                            path,
                            source: std::io::Error::other(e.to_string()),
                        },
                    }));
                }
            };

            let path = entry.path();
            if path == self.root {
                return None;
            }

            // Without follow_links, this is the symlink's own metadata.
            let link_meta = match entry.metadata() {
                Ok(m) => m,
                Err(e) => {
                    return Some(Err(ScanError::Io {
                        path,
                        source: std::io::Error::other(e.to_string()),
                    }));
                }
            };

            if link_meta.is_dir() {
                return None;
            }

            // Unfollowed symlinks are skipped outright: hashing through one
            // would double-count the link target.
            if link_meta.file_type().is_symlink() && !self.config.follow_symlinks {
                log::trace!("Skipping symlink: {}", path.display());
                return None;
            }

            let metadata = match std::fs::metadata(&path) {
                Ok(m) => m,
                Err(e) => {
                    return Some(Err(ScanError::Io { path, source: e }));
                }
            };

            if !self.passes_size_filter(metadata.len()) {
                log::trace!("Size filter excluded: {}", path.display());
                return None;
            }

            let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
            // Not every filesystem reports a creation time; fall back to the
            // modification time, which FileMeta::new minimizes against anyway.
            let created = metadata.created().unwrap_or(modified);

            let meta = FileMeta::new(path, metadata.len(), created, modified);

            if self.config.media_only && !meta.kind.is_media() {
                log::trace!("Non-media file excluded: {}", meta.path.display());
                return None;
            }

            Some(Ok(meta))
        })
    }
}

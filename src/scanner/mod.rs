//! Scanner module for directory traversal and chunk hashing.
//!
//! This module provides functionality for:
//! - Parallel directory walking using jwalk
//! - Media classification by file extension
//! - Streaming BLAKE3 digests over bounded byte ranges
//!
//! # Architecture
//!
//! The scanner is divided into submodules:
//! - [`walker`]: Directory traversal and file discovery
//! - [`chunk`]: Bounded-range BLAKE3 hashing (streaming)
//!
//! The walker produces a flat stream of [`FileMeta`] drafts; everything the
//! resolution engine needs is captured at discovery time so that no further
//! metadata calls are required during hashing.
//!
//! # Example
//!
//! ```no_run
//! use mediadupe::scanner::{Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let config = WalkerConfig {
//!     min_size: Some(1024),  // Skip files under 1KB
//!     skip_hidden: true,     // Skip hidden files
//!     ..Default::default()
//! };
//!
//! let walker = Walker::new(Path::new("/photos/incoming"), config);
//! for entry in walker.walk() {
//!     match entry {
//!         Ok(file) => println!("{}: {} bytes", file.path.display(), file.size),
//!         Err(e) => eprintln!("Warning: {}", e),
//!     }
//! }
//! ```

pub mod chunk;
pub mod walker;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::SystemTime;

use serde::Serialize;

// Re-export main types
pub use chunk::{digest_to_hex, ChunkHasher, Digest};
pub use walker::Walker;

/// Extensions recognized as photo content, including camera RAW formats.
const PHOTO_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "bmp", "tif", "tiff", "webp", "heic", "heif", "avif", // RAW
    "cr2", "cr3", "nef", "nrw", "arw", "srf", "dng", "raf", "orf", "rw2", "pef", "raw",
];

/// Extensions recognized as video content, including cinema RAW formats.
const VIDEO_EXTENSIONS: &[&str] = &[
    "mp4", "mov", "avi", "mkv", "m4v", "mts", "m2ts", "mpg", "mpeg", "wmv", "webm", // RAW
    "braw", "r3d",
];

/// Extensions recognized as audio content.
const AUDIO_EXTENSIONS: &[&str] = &[
    "mp3", "wav", "aac", "m4a", "flac", "ogg", "aif", "aiff", "wma",
];

/// Media classification of a discovered file.
///
/// Classification is by extension only; byte-level deduplication does not
/// depend on it, but reports and filters do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// Still image, including camera RAW formats.
    Photo,
    /// Video, including cinema RAW formats such as BRAW.
    Video,
    /// Audio recording.
    Audio,
    /// Anything else; still deduplicated, reported separately.
    Unsupported,
}

impl MediaKind {
    /// Classify a lowercase file extension.
    ///
    /// # Example
    ///
    /// ```
    /// use mediadupe::scanner::MediaKind;
    ///
    /// assert_eq!(MediaKind::from_extension("cr3"), MediaKind::Photo);
    /// assert_eq!(MediaKind::from_extension("braw"), MediaKind::Video);
    /// assert_eq!(MediaKind::from_extension("pdf"), MediaKind::Unsupported);
    /// ```
    #[must_use]
    pub fn from_extension(ext: &str) -> Self {
        if PHOTO_EXTENSIONS.contains(&ext) {
            Self::Photo
        } else if VIDEO_EXTENSIONS.contains(&ext) {
            Self::Video
        } else if AUDIO_EXTENSIONS.contains(&ext) {
            Self::Audio
        } else {
            Self::Unsupported
        }
    }

    /// Whether this kind is a recognized media format.
    #[must_use]
    pub fn is_media(self) -> bool {
        !matches!(self, Self::Unsupported)
    }
}

/// Which directory tree a file was discovered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    /// The tree being consolidated from.
    Source,
    /// The canonical library tree.
    Target,
}

/// Metadata draft for a discovered file.
///
/// Captures everything the resolution engine needs at discovery time:
/// path, size, capture-adjacent timestamp, and media classification.
#[derive(Debug, Clone)]
pub struct FileMeta {
    /// Absolute path to the file
    pub path: PathBuf,
    /// File size in bytes, fixed at discovery
    pub size: u64,
    /// Earliest of the reported creation and modification times.
    /// Copy operations frequently reset one of the two; the minimum is the
    /// best available stand-in for the capture date.
    pub created: SystemTime,
    /// Lowercase file extension, empty if none
    pub extension: String,
    /// Media classification derived from the extension
    pub kind: MediaKind,
}

impl FileMeta {
    /// Build a draft from raw scan attributes.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the file
    /// * `size` - File size in bytes
    /// * `created` - Reported creation time (falls back to `modified` on
    ///   filesystems that do not track it)
    /// * `modified` - Last modification time
    #[must_use]
    pub fn new(path: PathBuf, size: u64, created: SystemTime, modified: SystemTime) -> Self {
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        let kind = MediaKind::from_extension(&extension);
        Self {
            path,
            size,
            created: created.min(modified),
            extension,
            kind,
        }
    }
}

/// Configuration for directory walking.
///
/// Controls filtering, symlink handling, and other walk behavior.
#[derive(Debug, Clone, Default)]
pub struct WalkerConfig {
    /// Follow symbolic links during traversal.
    /// Warning: May cause infinite loops with symlink cycles.
    pub follow_symlinks: bool,

    /// Skip hidden files and directories (names starting with `.`).
    pub skip_hidden: bool,

    /// Minimum file size to include (in bytes).
    /// Files smaller than this are skipped.
    pub min_size: Option<u64>,

    /// Maximum file size to include (in bytes).
    /// Files larger than this are skipped.
    pub max_size: Option<u64>,

    /// Only yield recognized media files (photo/video/audio).
    pub media_only: bool,
}

/// Errors that can occur during directory scanning.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// Permission was denied when accessing a file or directory.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// The specified path was not found.
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    /// The specified path is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// An I/O error occurred while accessing a file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Errors that can occur while hashing a chunk of a file.
///
/// Cloneable (the I/O source is behind an `Arc`) so that per-file failures
/// can be carried in stats structs and reports.
#[derive(thiserror::Error, Debug, Clone)]
pub enum HashError {
    /// The specified file was not found.
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// Permission was denied when reading the file.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// An I/O error occurred while reading the file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: Arc<std::io::Error>,
    },
}

impl HashError {
    /// Classify a raw I/O error against the path it occurred on.
    #[must_use]
    pub fn from_io(path: &std::path::Path, err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: Arc::new(err),
            },
        }
    }

    /// The path the failure occurred on.
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::NotFound(p) | Self::PermissionDenied(p) => p,
            Self::Io { path, .. } => path,
        }
    }
}

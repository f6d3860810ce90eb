//! Candidate file records and their memoized chunk digests.

use std::path::PathBuf;
use std::time::SystemTime;

use serde::Serialize;

use crate::scanner::chunk::{digest_to_hex, ChunkHasher, Digest};
use crate::scanner::{FileMeta, HashError, MediaKind, Origin};

use super::ladder::DepthLadder;

/// Stable opaque identity of a [`FileRecord`].
///
/// Assigned once when the record enters a [`super::SizeIndex`]; equality and
/// hashing are independent of the record's path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RecordId(pub(crate) u64);

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Outcome of resolution for one record.
///
/// Cancelled or error-excluded records remain `Unresolved`; callers must
/// treat them as unknown rather than unique or duplicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Resolution {
    /// Not yet classified (initial state, cancellation, or I/O exclusion).
    Unresolved,
    /// Proven distinct from every comparable file of the same size.
    Unique,
    /// Shares its full content signature with at least one other record.
    Duplicate,
}

/// One candidate file in the deduplication run.
///
/// Created from scan metadata with no digests; per-chunk digests accumulate
/// lazily during resolution and are summarized and dropped once the
/// record's bucket settles, bounding memory for large collections.
#[derive(Debug, Clone)]
pub struct FileRecord {
    id: RecordId,
    /// Absolute path
    pub path: PathBuf,
    /// Byte size, fixed at discovery
    pub size: u64,
    /// Media classification
    pub kind: MediaKind,
    /// Lowercase extension
    pub extension: String,
    /// Min of reported creation/modification time
    pub created: SystemTime,
    /// Which tree the file was discovered in
    pub origin: Origin,
    resolution: Resolution,
    resolved_depth: Option<u64>,
    /// Per-chunk digest cache, indexed by chunk number; append-only.
    digests: Vec<Digest>,
    /// Digest of the concatenated chunk digests, fixed when the bucket
    /// settles. Survives compaction so groups can always be recomputed.
    summary: Option<Digest>,
}

impl FileRecord {
    /// Build a record from a scan draft.
    #[must_use]
    pub fn from_meta(id: RecordId, meta: FileMeta, origin: Origin) -> Self {
        Self {
            id,
            path: meta.path,
            size: meta.size,
            kind: meta.kind,
            extension: meta.extension,
            created: meta.created,
            origin,
            resolution: Resolution::Unresolved,
            resolved_depth: None,
            digests: Vec::new(),
            summary: None,
        }
    }

    /// Stable identity of this record.
    #[must_use]
    pub fn id(&self) -> RecordId {
        self.id
    }

    /// Current resolution state.
    #[must_use]
    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    /// Whether the record has been proven unique.
    #[must_use]
    pub fn is_unique(&self) -> bool {
        self.resolution == Resolution::Unique
    }

    /// Byte depth at which this record's classification settled, if it has.
    #[must_use]
    pub fn resolved_depth(&self) -> Option<u64> {
        self.resolved_depth
    }

    /// Digests computed so far, in chunk order.
    ///
    /// Empty once the record settles and compacts its cache; use
    /// [`signature`](Self::signature) afterwards.
    #[must_use]
    pub fn digests(&self) -> &[Digest] {
        &self.digests
    }

    /// Number of chunk digests computed for this record so far.
    #[must_use]
    pub fn chunk_count(&self) -> usize {
        self.digests.len()
    }

    /// Content signature: hex of the summary digest over all chunk digests
    /// in index order. `None` until the record settles with at least one
    /// computed digest (a unique-by-size record never hashes anything).
    #[must_use]
    pub fn signature(&self) -> Option<String> {
        self.summary.as_ref().map(digest_to_hex)
    }

    /// Return the digest for a chunk, computing and caching it on first use.
    ///
    /// A digest is never recomputed once stored: across repeated
    /// comparisons within a size bucket, each (file, chunk index) pair is
    /// hashed at most once for the lifetime of the resolution run. Chunk
    /// indices must be requested in ascending order, which the resolver's
    /// strictly increasing depth walk guarantees; any gap is filled by
    /// computing the skipped chunks first.
    ///
    /// # Errors
    ///
    /// Propagates [`HashError`] from the underlying read; on error nothing
    /// is cached for the failed index.
    pub fn checksum_for_chunk(
        &mut self,
        hasher: &ChunkHasher,
        ladder: &DepthLadder,
        index: usize,
    ) -> Result<Digest, HashError> {
        debug_assert!(index < ladder.len(), "chunk index beyond ladder");

        while self.digests.len() <= index {
            let chunk = ladder.chunk(self.digests.len());
            match hasher.digest(&self.path, chunk.offset, chunk.len)? {
                Some(digest) => self.digests.push(digest),
                None => {
                    // The ladder never addresses past EOF for the size the
                    // file had at scan time, so the file shrank since.
                    return Err(HashError::Io {
                        path: self.path.clone(),
                        source: std::sync::Arc::new(std::io::Error::new(
                            std::io::ErrorKind::UnexpectedEof,
                            format!("file shrank below {} bytes", chunk.offset + chunk.len),
                        )),
                    });
                }
            }
        }
        Ok(self.digests[index])
    }

    /// Install the empty-input digest as the record's only chunk digest.
    ///
    /// Zero-byte files have nothing to read; their signature is the digest
    /// of zero bytes, shared by every empty file.
    pub(crate) fn adopt_empty_digest(&mut self) {
        if self.digests.is_empty() {
            self.digests.push(ChunkHasher::empty_digest());
        }
    }

    /// Settle the record and compact its digest cache.
    ///
    /// Computes the summary signature from whatever digests were cached,
    /// then drops the per-chunk cache. Settling an already-settled record
    /// is a no-op so that re-resolving an unchanged index is idempotent.
    pub(crate) fn settle(&mut self, resolution: Resolution, depth: u64) {
        if self.resolution != Resolution::Unresolved {
            return;
        }
        debug_assert!(
            resolution != Resolution::Duplicate || !self.digests.is_empty(),
            "duplicate classification requires at least one digest"
        );

        if !self.digests.is_empty() {
            let mut hasher = blake3::Hasher::new();
            for digest in &self.digests {
                hasher.update(digest);
            }
            self.summary = Some(*hasher.finalize().as_bytes());
        }
        self.resolution = resolution;
        self.resolved_depth = Some(depth);
        self.digests = Vec::new();
    }
}

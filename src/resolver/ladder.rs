//! Logarithmically spaced read-depth ladder.
//!
//! # Overview
//!
//! Files of equal size that are not duplicates almost always diverge within
//! the first few hundred bytes (container headers, EXIF blocks, frame
//! indexes). The ladder therefore starts at a tiny probe depth and grows
//! geometrically up to the full file size, bounding the number of hash
//! passes over any file to O(log size).
//!
//! The ladder also owns the chunk geometry: chunk *i* covers the bytes
//! between depth *i - 1* and depth *i* (chunk 0 starts at offset zero), so
//! the cumulative digest sequence through chunk *i* is exactly a digest of
//! the first `depth(i)` bytes. A chunk is hashed once and never re-read
//! when the ladder advances.

/// Smallest read depth probed, in bytes.
pub const MIN_PROBE: u64 = 128;

/// Geometric growth factor between consecutive depths.
const LADDER_GROWTH: u64 = 8;

/// One bounded byte range of a file, addressed by chunk index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkSpec {
    /// Zero-based chunk index
    pub index: usize,
    /// Byte offset the chunk starts at
    pub offset: u64,
    /// Chunk length in bytes
    pub len: u64,
}

/// Ascending sequence of checksum read depths for one file size.
///
/// Strictly increasing, deduplicated, and always ending exactly at the file
/// size. Zero-byte files have an empty ladder; the resolver short-circuits
/// them before consulting it.
///
/// # Example
///
/// ```
/// use mediadupe::resolver::DepthLadder;
///
/// let ladder = DepthLadder::for_size(500);
/// assert_eq!(ladder.depths(), &[128, 500]);
///
/// // A huge file still needs only a handful of passes.
/// let ladder = DepthLadder::for_size(64 * 1024 * 1024 * 1024);
/// assert!(ladder.len() < 12);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepthLadder {
    depths: Vec<u64>,
}

impl DepthLadder {
    /// Build the ladder for a file of `size` bytes.
    #[must_use]
    pub fn for_size(size: u64) -> Self {
        if size == 0 {
            return Self { depths: Vec::new() };
        }

        let mut depths = Vec::new();
        let mut depth = MIN_PROBE.min(size);
        loop {
            depths.push(depth);
            if depth == size {
                break;
            }
            depth = depth.saturating_mul(LADDER_GROWTH).min(size);
        }
        Self { depths }
    }

    /// The depth sequence in bytes.
    #[must_use]
    pub fn depths(&self) -> &[u64] {
        &self.depths
    }

    /// Number of ladder steps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.depths.len()
    }

    /// Whether the ladder has no steps (only for zero-byte files).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.depths.is_empty()
    }

    /// Read depth at a ladder step.
    ///
    /// # Panics
    ///
    /// Panics if `step` is out of range.
    #[must_use]
    pub fn depth(&self, step: usize) -> u64 {
        self.depths[step]
    }

    /// Byte range of the chunk introduced at a ladder step.
    ///
    /// # Panics
    ///
    /// Panics if `step` is out of range.
    #[must_use]
    pub fn chunk(&self, step: usize) -> ChunkSpec {
        let offset = if step == 0 { 0 } else { self.depths[step - 1] };
        ChunkSpec {
            index: step,
            offset,
            len: self.depths[step] - offset,
        }
    }
}

//! Progressive-uniqueness resolution.
//!
//! This module holds the core of the deduplication engine:
//! - [`SizeIndex`]: files grouped by exact byte size, the free first
//!   discriminator
//! - [`FileRecord`]: one candidate file with its memoized chunk digests
//! - [`DepthLadder`]: the logarithmically spaced read-depth schedule
//! - [`resolve`]: the algorithm that proves each file unique or duplicate
//!   with the minimum read depth the bucket allows

pub mod engine;
pub mod index;
pub mod ladder;
pub mod record;

pub use engine::{resolve, ResolveConfig, ResolveStats};
pub use index::SizeIndex;
pub use ladder::{ChunkSpec, DepthLadder, MIN_PROBE};
pub use record::{FileRecord, RecordId, Resolution};

//! The progressive-uniqueness resolution engine.
//!
//! # Overview
//!
//! For every size bucket with more than one file, the engine walks the
//! bucket's [`DepthLadder`](super::DepthLadder) in strictly increasing
//! depth order. At each depth it extends every still-contested record's
//! digest sequence by one chunk, then partitions the contested records by
//! their cumulative digest sequence:
//!
//! - a record whose sequence matches no other contested record is proven
//!   unique at that depth and retires from further hashing;
//! - records sharing a sequence stay contested and are read deeper;
//! - at the final depth (the full file size), records still sharing a
//!   sequence are confirmed duplicates.
//!
//! Buckets with exactly one file are marked unique with zero I/O, which is
//! the dominant path for real media collections. Buckets are independent
//! and processed in parallel on a bounded I/O pool.
//!
//! # Example
//!
//! ```no_run
//! use mediadupe::resolver::{resolve, ResolveConfig, SizeIndex};
//! use mediadupe::scanner::{Origin, Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let mut index = SizeIndex::new();
//! let walker = Walker::new(Path::new("/photos"), WalkerConfig::default());
//! index.extend(walker.walk().filter_map(Result::ok), Origin::Source);
//!
//! let stats = resolve(&mut index, &ResolveConfig::default());
//! println!(
//!     "{} unique, {} duplicates, {} bytes hashed",
//!     stats.unique_files, stats.duplicate_files, stats.bytes_hashed
//! );
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use rayon::prelude::*;

use crate::progress::ProgressCallback;
use crate::scanner::chunk::{ChunkHasher, Digest};
use crate::scanner::HashError;

use super::index::SizeIndex;
use super::ladder::DepthLadder;
use super::record::{FileRecord, Resolution};

/// Configuration for a resolution run.
#[derive(Clone)]
pub struct ResolveConfig {
    /// Number of I/O threads for parallel hashing.
    /// Default is 4 to prevent disk thrashing; the work is disk-bound,
    /// not CPU-bound.
    pub io_threads: usize,
    /// The chunk hasher to use.
    pub hasher: ChunkHasher,
    /// Optional shutdown flag for cooperative cancellation.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for ResolveConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolveConfig")
            .field("io_threads", &self.io_threads)
            .field("hasher", &self.hasher)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Default for ResolveConfig {
    fn default() -> Self {
        Self {
            io_threads: 4,
            hasher: ChunkHasher::new(),
            shutdown_flag: None,
            progress_callback: None,
        }
    }
}

impl ResolveConfig {
    /// Create a configuration with a custom I/O thread count.
    #[must_use]
    pub fn with_io_threads(mut self, threads: usize) -> Self {
        self.io_threads = threads.max(1);
        self
    }

    /// Set the shutdown flag for cooperative cancellation.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Check if cancellation has been requested.
    fn is_cancelled(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }
}

/// Statistics from one resolution run.
///
/// Counts describe work done in this run; an idempotent re-run over an
/// already-settled index reports zero hashing.
#[derive(Debug, Clone, Default)]
pub struct ResolveStats {
    /// Total records in the index
    pub total_files: usize,
    /// Total size buckets
    pub total_buckets: usize,
    /// Buckets with 2+ files (the ones that need hashing)
    pub multi_file_buckets: usize,
    /// Multi-file buckets fully settled during this run
    pub buckets_resolved: usize,
    /// Records proven unique during this run
    pub unique_files: usize,
    /// Records confirmed duplicate during this run
    pub duplicate_files: usize,
    /// Records excluded from comparison due to I/O errors
    pub excluded_files: usize,
    /// Chunk digests actually computed (cache hits not counted)
    pub chunk_hashes: u64,
    /// Bytes read and hashed
    pub bytes_hashed: u64,
    /// Per-file hashing errors; never fatal to the run
    pub errors: Vec<HashError>,
    /// Whether the run was interrupted by cancellation
    pub interrupted: bool,
}

impl ResolveStats {
    /// Files classified unique by size alone (singleton buckets).
    #[must_use]
    pub fn eliminated_by_size(&self) -> usize {
        self.total_buckets - self.multi_file_buckets
    }

    /// Percentage of files eliminated by the size index with zero I/O.
    #[must_use]
    pub fn size_elimination_rate(&self) -> f64 {
        if self.total_files == 0 {
            0.0
        } else {
            (self.eliminated_by_size() as f64 / self.total_files as f64) * 100.0
        }
    }
}

/// Outcome of resolving one bucket.
#[derive(Debug, Default)]
struct BucketOutcome {
    unique: usize,
    duplicate: usize,
    excluded: usize,
    chunk_hashes: u64,
    bytes_hashed: u64,
    errors: Vec<HashError>,
    cancelled: bool,
}

/// Resolve every bucket of the index, classifying each record as unique or
/// duplicate (or leaving it unresolved on cancellation or I/O failure).
///
/// Singleton buckets are settled immediately with zero I/O. Multi-file
/// buckets are processed in parallel on a dedicated pool of
/// `config.io_threads` threads; within a bucket, depths advance strictly
/// in ladder order, and the per-file digest computations at one depth run
/// in parallel as well.
///
/// Cancellation is checked at bucket and depth boundaries. A cancelled run
/// keeps every already-settled classification; unprocessed records remain
/// [`Resolution::Unresolved`].
///
/// Re-running over an unchanged index is idempotent: settled records are
/// never reclassified and nothing is re-hashed for them.
pub fn resolve(index: &mut SizeIndex, config: &ResolveConfig) -> ResolveStats {
    let mut stats = ResolveStats {
        total_files: index.len(),
        total_buckets: index.bucket_count(),
        multi_file_buckets: index.multi_bucket_count(),
        ..Default::default()
    };

    // Fast path: a size shared by no other file proves uniqueness outright.
    for (_size, bucket) in index.buckets_mut() {
        if bucket.len() == 1 && bucket[0].resolution() == Resolution::Unresolved {
            bucket[0].settle(Resolution::Unique, 0);
            stats.unique_files += 1;
        }
    }

    let mut multi: Vec<(u64, &mut Vec<FileRecord>)> = index
        .buckets_mut()
        .filter(|(_, bucket)| bucket.len() > 1)
        .collect();

    if multi.is_empty() {
        log::info!(
            "Resolution complete: {} files, every size unique, nothing hashed",
            stats.total_files
        );
        return stats;
    }

    // Largest buckets first so the slowest work starts earliest.
    multi.sort_by(|a, b| {
        let weight = |(size, bucket): &(u64, &mut Vec<FileRecord>)| {
            size.saturating_mul(bucket.len() as u64)
        };
        weight(b).cmp(&weight(a))
    });

    if let Some(ref callback) = config.progress_callback {
        callback.on_phase_start("resolve", multi.len());
    }
    log::info!(
        "Resolving {} multi-file buckets ({} candidate files)",
        multi.len(),
        multi.iter().map(|(_, b)| b.len()).sum::<usize>()
    );

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.io_threads)
        .build()
        .unwrap_or_else(|_| {
            log::warn!(
                "Failed to create bounded thread pool, using global pool with {} threads",
                rayon::current_num_threads()
            );
            rayon::ThreadPoolBuilder::new().build().unwrap()
        });

    let completed = AtomicUsize::new(0);
    let outcomes: Vec<BucketOutcome> = pool.install(|| {
        multi
            .into_par_iter()
            .map(|(size, bucket)| {
                let n_files = bucket.len();
                let outcome = resolve_bucket(size, bucket, config);

                let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                if let Some(ref callback) = config.progress_callback {
                    callback.on_progress(done, &format!("{n_files} files @ {size} bytes"));
                    callback.on_item_completed(outcome.bytes_hashed);
                }
                outcome
            })
            .collect()
    });

    for outcome in outcomes {
        stats.unique_files += outcome.unique;
        stats.duplicate_files += outcome.duplicate;
        stats.excluded_files += outcome.excluded;
        stats.chunk_hashes += outcome.chunk_hashes;
        stats.bytes_hashed += outcome.bytes_hashed;
        stats.errors.extend(outcome.errors);
        if outcome.cancelled {
            stats.interrupted = true;
        } else {
            stats.buckets_resolved += 1;
        }
    }

    if let Some(ref callback) = config.progress_callback {
        callback.on_phase_end("resolve");
    }

    if stats.interrupted {
        log::info!(
            "Resolution interrupted: {}/{} buckets settled",
            stats.buckets_resolved,
            stats.multi_file_buckets
        );
    } else {
        log::info!(
            "Resolution complete: {} unique, {} duplicates, {} chunks / {} bytes hashed",
            stats.unique_files,
            stats.duplicate_files,
            stats.chunk_hashes,
            stats.bytes_hashed
        );
    }

    stats
}

/// Resolve a single multi-file bucket in place.
fn resolve_bucket(size: u64, bucket: &mut Vec<FileRecord>, config: &ResolveConfig) -> BucketOutcome {
    let mut outcome = BucketOutcome::default();

    if config.is_cancelled() {
        outcome.cancelled = true;
        return outcome;
    }

    // Records settled in an earlier run keep their classification.
    let mut live: Vec<bool> = bucket
        .iter()
        .map(|r| r.resolution() == Resolution::Unresolved)
        .collect();
    if !live.iter().any(|&l| l) {
        return outcome;
    }

    // Zero-byte files are byte-identical by definition; their signature is
    // the digest of zero bytes.
    if size == 0 {
        for (i, is_live) in live.iter().enumerate() {
            if *is_live {
                bucket[i].adopt_empty_digest();
                bucket[i].settle(Resolution::Duplicate, 0);
                outcome.duplicate += 1;
            }
        }
        return outcome;
    }

    let ladder = DepthLadder::for_size(size);
    let hasher = &config.hasher;

    for step in 0..ladder.len() {
        if config.is_cancelled() {
            // Retired records stay classified; contested ones stay unknown.
            outcome.cancelled = true;
            return outcome;
        }

        let depth = ladder.depth(step);
        let prev_counts: Vec<usize> = bucket.iter().map(FileRecord::chunk_count).collect();

        // Extend every contested record by this step's chunk, in parallel.
        let failures: Vec<Option<HashError>> = bucket
            .par_iter_mut()
            .enumerate()
            .map(|(i, record)| {
                if !live[i] {
                    return None;
                }
                match record.checksum_for_chunk(hasher, &ladder, step) {
                    Ok(_) => None,
                    Err(e) => Some(e),
                }
            })
            .collect();

        for (i, failure) in failures.into_iter().enumerate() {
            if let Some(error) = failure {
                log::warn!(
                    "Excluding {} from duplicate comparison: {}",
                    bucket[i].path.display(),
                    error
                );
                live[i] = false;
                outcome.excluded += 1;
                outcome.errors.push(error);
            }
        }

        for (i, record) in bucket.iter().enumerate() {
            for chunk_index in prev_counts[i]..record.chunk_count() {
                outcome.chunk_hashes += 1;
                outcome.bytes_hashed += ladder.chunk(chunk_index).len;
            }
        }

        // Partition contested records by cumulative digest sequence.
        let mut partitions: HashMap<Vec<Digest>, Vec<usize>> = HashMap::new();
        for (i, is_live) in live.iter().enumerate() {
            if *is_live {
                partitions
                    .entry(bucket[i].digests()[..=step].to_vec())
                    .or_default()
                    .push(i);
            }
        }

        let is_final = step + 1 == ladder.len();
        let mut next_live = vec![false; bucket.len()];
        for members in partitions.into_values() {
            if members.len() == 1 {
                // No other contested file shares this prefix: proven unique
                // at the shallowest depth that separates it.
                bucket[members[0]].settle(Resolution::Unique, depth);
                outcome.unique += 1;
            } else if is_final {
                for i in members {
                    bucket[i].settle(Resolution::Duplicate, depth);
                    outcome.duplicate += 1;
                }
            } else {
                for i in members {
                    next_live[i] = true;
                }
            }
        }
        live = next_live;

        if !live.iter().any(|&l| l) {
            log::debug!(
                "Bucket {}: settled at depth {} of {}",
                size,
                depth,
                ladder.depth(ladder.len() - 1)
            );
            break;
        }
    }

    outcome
}

//! Duplicate grouping over resolved records.
//!
//! # Overview
//!
//! After a resolution pass, records marked duplicate are grouped by their
//! full content signature. Every member of a group has the same byte size
//! and the same digest sequence; groups are sorted by size descending so
//! the largest reclaimable space surfaces first.
//!
//! # Example
//!
//! ```no_run
//! use mediadupe::duplicates::group_duplicates;
//! use mediadupe::resolver::{resolve, ResolveConfig, SizeIndex};
//!
//! let mut index = SizeIndex::new();
//! // ... populate and resolve ...
//! resolve(&mut index, &ResolveConfig::default());
//!
//! let (groups, stats) = group_duplicates(&index);
//! for group in &groups {
//!     println!("{} copies of {} bytes", group.len(), group.size);
//! }
//! println!("{} bytes reclaimable", stats.wasted_bytes);
//! ```

use std::collections::HashMap;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::resolver::{RecordId, Resolution, SizeIndex};
use crate::scanner::{MediaKind, Origin};

/// One file inside a duplicate group.
#[derive(Debug, Clone, Serialize)]
pub struct GroupMember {
    /// Stable record identity
    pub id: RecordId,
    /// Absolute path
    pub path: PathBuf,
    /// Which tree the file came from
    pub origin: Origin,
    /// Media classification
    pub kind: MediaKind,
    /// Best available capture-adjacent timestamp
    pub created: DateTime<Utc>,
}

/// A set of byte-identical files.
///
/// Derived, read-only view over the index: all members share one size and
/// one full digest signature.
#[derive(Debug, Clone, Serialize)]
pub struct DuplicateGroup {
    /// File size shared by every member
    pub size: u64,
    /// Hex content signature shared by every member
    pub signature: String,
    /// The byte-identical files
    pub files: Vec<GroupMember>,
}

impl DuplicateGroup {
    /// Number of files in this group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if this group is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Total size of all copies.
    #[must_use]
    pub fn total_size(&self) -> u64 {
        self.size * self.files.len() as u64
    }

    /// Space reclaimable by keeping a single copy.
    #[must_use]
    pub fn wasted_space(&self) -> u64 {
        self.size * (self.files.len() as u64).saturating_sub(1)
    }

    /// Whether at least one member already lives in the target tree.
    ///
    /// Such a group needs no move at all: the canonical library already
    /// holds the content.
    #[must_use]
    pub fn has_target_copy(&self) -> bool {
        self.files.iter().any(|f| f.origin == Origin::Target)
    }

    /// Paths of all members.
    #[must_use]
    pub fn paths(&self) -> Vec<PathBuf> {
        self.files.iter().map(|f| f.path.clone()).collect()
    }
}

/// Statistics from a grouping pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GroupingStats {
    /// Records that carried a duplicate classification
    pub duplicate_records: usize,
    /// Groups emitted (2+ members each)
    pub groups: usize,
    /// Bytes reclaimable across all groups
    pub wasted_bytes: u64,
    /// Duplicate records whose signature matched nobody (dropped)
    pub dropped_singletons: usize,
}

/// Partition duplicate-classified records into groups by content signature.
///
/// Filters to records with [`Resolution::Duplicate`] and a computed
/// signature, groups them by (size, signature), and emits only groups with
/// two or more members. A duplicate record whose signature matches no other
/// record indicates an inconsistent resolution state; it is dropped with a
/// warning rather than crashing the run.
///
/// Groups are sorted by size descending (largest reclaimable space first),
/// then by signature for a deterministic order.
#[must_use]
pub fn group_duplicates(index: &SizeIndex) -> (Vec<DuplicateGroup>, GroupingStats) {
    let mut stats = GroupingStats::default();
    let mut by_signature: HashMap<(u64, String), Vec<GroupMember>> = HashMap::new();

    for record in index.records() {
        if record.resolution() != Resolution::Duplicate {
            continue;
        }
        let Some(signature) = record.signature() else {
            log::error!(
                "Record {} marked duplicate without any digest; ignoring",
                record.path.display()
            );
            debug_assert!(false, "duplicate record without digests");
            continue;
        };
        stats.duplicate_records += 1;
        by_signature
            .entry((record.size, signature))
            .or_default()
            .push(GroupMember {
                id: record.id(),
                path: record.path.clone(),
                origin: record.origin,
                kind: record.kind,
                created: DateTime::<Utc>::from(record.created),
            });
    }

    let mut groups: Vec<DuplicateGroup> = Vec::with_capacity(by_signature.len());
    for ((size, signature), files) in by_signature {
        if files.len() < 2 {
            log::warn!(
                "Duplicate record with unmatched signature {} dropped: {}",
                signature,
                files[0].path.display()
            );
            stats.dropped_singletons += 1;
            continue;
        }
        groups.push(DuplicateGroup {
            size,
            signature,
            files,
        });
    }

    groups.sort_by(|a, b| b.size.cmp(&a.size).then_with(|| a.signature.cmp(&b.signature)));
    for group in &mut groups {
        group.files.sort_by(|a, b| a.path.cmp(&b.path));
    }

    stats.groups = groups.len();
    stats.wasted_bytes = groups.iter().map(DuplicateGroup::wasted_space).sum();

    log::info!(
        "Grouping complete: {} groups, {} duplicate files, {} bytes reclaimable",
        stats.groups,
        stats.duplicate_records,
        stats.wasted_bytes
    );

    (groups, stats)
}

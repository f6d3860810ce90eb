//! Duplicate group derivation.
//!
//! Once resolution has settled a bucket, records confirmed as duplicates
//! are partitioned into groups sharing an identical content signature.
//! Groups are always recomputed from the current index state, never
//! patched incrementally.

pub mod groups;

pub use groups::{group_duplicates, DuplicateGroup, GroupMember, GroupingStats};

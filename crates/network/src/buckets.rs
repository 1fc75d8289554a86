// crates/network/src/buckets.rs
//! Mapping from hymn index to remote collection
//!
//! The recordings are split across four remote collections per edition and
//! variant, 200 tracks each, with the last collection holding everything
//! from index 600 on. The partitioning is fixed by the remote service.
//!
//! The collection ids below are placeholders standing in for the remote
//! service's real identifiers; they have not been checked against the live
//! catalogue and must be replaced before resolving against production.

use hymnal_core::{HymnRef, HymnalVersion};

/// Tracks per collection
pub const BUCKET_SIZE: usize = 200;

/// Collections per (edition, variant)
pub const BUCKET_COUNT: usize = 4;

// [edition][variant][bucket], variant 0 = instrumental, 1 = vocal.
// Placeholder ids, see module docs.
const COLLECTIONS: [[[&str; BUCKET_COUNT]; 2]; 2] = [
    // Standard
    [
        ["n4Zg8", "DZ1Aa", "mA7ol", "q0Wbk"],
        ["Lrj2E", "eVZ7x", "KdP2j", "pz9Oy"],
    ],
    // Revised
    [
        ["wO3Zr", "Ak2Ye", "YbdQ8", "jRl0N"],
        ["9yGLm", "VQxMJ", "Xv2Dq", "GPb5z"],
    ],
];

/// Where a hymn's recording lives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectionSlot {
    pub collection_id: &'static str,
    /// Bucket number, 0..BUCKET_COUNT
    pub bucket: usize,
    /// Position within the collection's track list
    pub position: usize,
}

/// Splits a zero-based index into (bucket, position within bucket)
pub fn bucket_for(index: usize) -> (usize, usize) {
    let bucket = (index / BUCKET_SIZE).min(BUCKET_COUNT - 1);
    (bucket, index - bucket * BUCKET_SIZE)
}

/// Remote collection id for an edition, variant and bucket
///
/// Buckets past the last one clamp to the last collection.
pub fn collection_id(version: HymnalVersion, vocal: bool, bucket: usize) -> &'static str {
    let edition = match version {
        HymnalVersion::Standard => 0,
        HymnalVersion::Revised => 1,
    };
    COLLECTIONS[edition][usize::from(vocal)][bucket.min(BUCKET_COUNT - 1)]
}

/// Locates the collection and track position for a hymn
pub fn locate(hymn: HymnRef, vocal: bool) -> CollectionSlot {
    let (bucket, position) = bucket_for(hymn.index);
    CollectionSlot {
        collection_id: collection_id(hymn.hymnal_version, vocal, bucket),
        bucket,
        position,
    }
}

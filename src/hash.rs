//! The seeded content-hash fingerprint described in spec §4.5.
//!
//! Two allocators that saw the same sequence of `allocate`/`free` calls
//! must produce the same hash. The hash is a pure function of the
//! geometric occupancy visible through [`crate::AtlasAllocator::enumerate`]
//! — block ids, names and shelf heights are deliberately left out so the
//! fingerprint is stable across runs that differ only in bookkeeping
//! details that don't affect layout.

use std::hash::Hasher;
use twox_hash::XxHash64;

/// One block's contribution to the content hash, fed in the exact field
/// order spec §4.5 specifies.
pub(crate) fn hash_block(hasher: &mut XxHash64, in_use: bool, offset: u32, shelf_y: u32, width: u32, height: u32) {
    hasher.write_u8(in_use as u8);
    hasher.write_u64(offset as u64);
    hasher.write_u64(shelf_y as u64);
    hasher.write_u64(width as u64);
    hasher.write_u64(height as u64);
}

pub(crate) fn new_hasher(seed: u64) -> XxHash64 {
    XxHash64::with_seed(seed)
}

pub(crate) fn finish(hasher: XxHash64) -> u64 {
    hasher.finish()
}

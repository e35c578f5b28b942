use thiserror::Error;

/// Failures surfaced by the allocator's public contract.
///
/// `free`, `get`, and the accounting queries cannot fail; only
/// [`AtlasAllocator::allocate`](crate::AtlasAllocator::allocate) and
/// [`AtlasAllocator::allocate_named`](crate::AtlasAllocator::allocate_named)
/// return this type. Zero-sized requests and malformed construction
/// parameters are programmer errors and panic instead of returning an
/// `AllocatorError` — see the crate-level docs.
#[derive(Error, Copy, Clone, Debug, PartialEq, Eq)]
pub enum AllocatorError {
    /// No placement satisfying the request could be found. The allocator
    /// state is unchanged and remains safe to use.
    #[error("no space left to place a rectangle of the requested size")]
    OutOfSpace,
}

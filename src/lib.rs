//! Dynamic 2D texture atlas allocation using the shelf-packing heuristic.
//!
//! Rectangles are packed into horizontal rows ("shelves") whose height is
//! fixed by the first rectangle placed into them. Each shelf is split
//! left-to-right into blocks; freeing a block coalesces it with adjacent
//! free blocks on the same shelf, and an empty topmost shelf is reclaimed
//! so its height budget can be reused.
//!
//! See [`AtlasAllocator`] for the main entry point.

#[cfg(feature = "serialization")]
#[macro_use]
extern crate serde;
pub extern crate euclid;

mod allocator;
mod error;
mod geometry;
mod hash;
#[cfg(feature = "svg")]
pub mod svg;

pub use allocator::{
    AllocId, Allocation, AllocatorOptions, AtlasAllocator, BlockView, DEFAULT_OPTIONS,
};
pub use error::AllocatorError;
pub use euclid::{point2, size2};
pub use geometry::{Point, Rectangle, Size};

//! Integer geometry primitives, re-exported from `euclid` the way the
//! upstream allocator does. The allocator enforces non-negative
//! coordinates and positive rectangle dimensions itself; these aliases
//! carry no invariants of their own.

pub type Point = euclid::default::Point2D<i32>;
pub type Size = euclid::default::Size2D<i32>;
pub type Rectangle = euclid::default::Box2D<i32>;

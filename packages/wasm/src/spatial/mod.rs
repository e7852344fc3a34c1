//! Spatial indexing for O(log n) hit testing.
//!
//! Person boxes from a [`ForestLayout`](crate::layout::ForestLayout) go into an
//! R-tree so pointer events can be mapped back to people.

mod rtree;

pub use rtree::{PersonBox, SpatialIndex};

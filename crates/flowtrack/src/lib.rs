//! Two-frame point correspondence and motion field estimation.
//!
//! Points of two observations are optionally split into clusters, matched by
//! proximity and descriptor similarity, and the resulting displacements drive
//! a velocity field that can be queried anywhere on a grid.

#[doc(inline)]
pub use flowtrack_core as geometry;

#[doc(inline)]
pub use flowtrack_assignment as assignment;

#[doc(inline)]
pub use flowtrack_cluster as cluster;

#[doc(inline)]
pub use flowtrack_field as field;

#[doc(inline)]
pub use flowtrack_matching as matching;

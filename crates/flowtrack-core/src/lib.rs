#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Error types for the core module.
pub mod error;
pub use error::CoreError;

/// Distance and similarity strategies.
pub mod metric;

/// Points, grid cells and point sets.
pub mod point;
pub use point::{GridCell, Point2d, PointSet, Velocity};

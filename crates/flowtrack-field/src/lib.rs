#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

mod error;
pub use error::FieldError;

/// Decay kernels weighting the influence of an anchor by distance.
pub mod gravity;
pub use gravity::{Gravity, InverseDistance, Newton};

mod grid;
pub use grid::*;

/// Visualisation sinks for velocity maps.
pub mod sink;
pub use sink::FieldSink;

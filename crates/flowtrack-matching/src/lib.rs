#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Sparse index-to-index correspondences.
pub mod correspondence;
pub use correspondence::Correspondences;

mod error;
pub use error::MatchingError;

mod matcher;
pub use matcher::*;

/// Hooks receiving the computed score population.
pub mod observer;
pub use observer::{ScoreObserver, ScorePopulation};

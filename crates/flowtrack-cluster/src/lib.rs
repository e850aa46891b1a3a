#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

mod decompose;
pub use decompose::{decompose, Linkage};

mod error;
pub use error::ClusterError;

/// Disjoint-set forest over point indices.
pub mod disjoint_set;

#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

mod error;
pub use error::AssignmentError;

mod hungarian;
pub use hungarian::*;

/// Errors that can occur when decomposing a point set.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ClusterError {
    /// The point set has no points.
    #[error("Cannot decompose an empty point set")]
    EmptyInput,

    /// The maximum edge length is negative or not a number.
    #[error("Maximum edge length must be non-negative, got {0}")]
    InvalidThreshold(f64),
}

/// An error type for the core geometry primitives.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum CoreError {
    /// The operation requires at least one point.
    #[error("Point set is empty")]
    EmptyInput,
}

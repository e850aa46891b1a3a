/// Errors that can occur when matching two observations.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum MatchingError {
    /// Error from the assignment solver.
    #[error(transparent)]
    Assignment(#[from] flowtrack_assignment::AssignmentError),

    /// The matcher configuration is not valid.
    #[error("Invalid matcher configuration: {0}")]
    InvalidConfig(String),

    /// The number of points does not match the number of descriptors.
    #[error("Number of points ({0}) does not match the number of descriptors ({1})")]
    LengthMismatch(usize, usize),

    /// A descriptor does not have the session descriptor length.
    #[error("Descriptor length ({found}) does not match the expected length ({expected})")]
    DescriptorLength {
        /// The descriptor length of the session.
        expected: usize,
        /// The offending descriptor length.
        found: usize,
    },
}

/// Errors that can occur when solving an assignment problem.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum AssignmentError {
    /// The solver configuration is not valid.
    #[error("Invalid solver configuration: {0}")]
    InvalidConfig(String),

    /// The cost matrix holds a negative or non-finite entry.
    #[error("Invalid cost {value} at ({row}, {col}), costs must be finite and non-negative")]
    InvalidCost {
        /// Row of the offending entry.
        row: usize,
        /// Column of the offending entry.
        col: usize,
        /// The offending value.
        value: f64,
    },

    /// The solver did not reach a full zero cover within the iteration cap.
    #[error("Assignment did not converge after {iterations} iterations")]
    Unconverged {
        /// The number of iterations performed.
        iterations: usize,
    },
}
